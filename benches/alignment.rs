use burn_log_parser::pipelines::token_classification::alignment::{align, pre_tokenize};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const LINE: &str = r#"192.168.1.20 - frank [10/Oct/2023:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;

fn fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("client_ip", "192.168.1.20"),
        ("user", "frank"),
        ("timestamp", "10/Oct/2023:13:55:36 -0700"),
        ("method", "GET"),
        ("path", "/apache_pb.gif"),
        ("protocol", "HTTP/1.0"),
        ("status", "200"),
        ("size", "2326"),
        ("referrer", "http://www.example.com/start.html"),
        ("user_agent", "Mozilla/4.08 [en] (Win98; I ;Nav)"),
    ]
}

fn bench_alignment(c: &mut Criterion) {
    let fields = fields();

    c.bench_function("pre_tokenize_line", |b| {
        b.iter(|| pre_tokenize(black_box(LINE)));
    });

    c.bench_function("align_line", |b| {
        let words = pre_tokenize(LINE);

        b.iter(|| align(black_box(words.as_slice()), black_box(fields.as_slice())));
    });
}

criterion_group!(benches, bench_alignment);
criterion_main!(benches);
