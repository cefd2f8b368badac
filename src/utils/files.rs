use tokio::{
    fs::File,
    io::{self, AsyncBufReadExt, Lines},
};

/// Read the non-blank lines of a file, such as a batch of raw log lines to parse
pub async fn read_lines(path: &str) -> io::Result<Vec<String>> {
    let mut r = file_reader(path).await?;
    let mut lines = Vec::new();

    while let Some(line) = r.next_line().await? {
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    Ok(lines)
}

async fn file_reader(path: &str) -> io::Result<Lines<io::BufReader<File>>> {
    let f = File::open(path).await?;

    Ok(io::BufReader::new(f).lines())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_read_lines_skips_blanks() {
        let path = std::env::temp_dir().join(format!("log-lines-{}.txt", std::process::id()));
        tokio::fs::write(&path, "first\n\n   \nsecond\n").await.unwrap();

        let lines = read_lines(path.to_str().unwrap()).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(lines, vec!["first", "second"]);
    }
}
