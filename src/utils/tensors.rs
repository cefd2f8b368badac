use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Pad (or truncate) id lists to a fixed length, typically to line up targets with a tokenized
/// and padded batch
pub fn pad_to<B: Backend>(
    pad_id: usize,
    ids_list: Vec<Vec<usize>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = ids_list.len();

    let mut values = vec![(pad_id as i64).elem::<B::IntElem>(); batch_size * seq_length];

    for (row, ids) in ids_list.into_iter().enumerate() {
        for (col, id) in ids.into_iter().take(seq_length).enumerate() {
            values[row * seq_length + col] = (id as i64).elem();
        }
    }

    Tensor::from_data(
        Data::new(values, Shape::new([batch_size, seq_length])),
        device,
    )
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_pad_to_pads_and_truncates() {
        let device = Default::default();

        let tensor = pad_to::<NdArray>(0, vec![vec![1, 2, 3], vec![4]], 2, &device);

        assert_eq!(tensor.dims(), [2, 2]);
        assert_eq!(tensor.into_data().convert::<i64>().value, vec![1, 2, 4, 0]);
    }

    #[test]
    fn test_pad_to_custom_pad() {
        let device = Default::default();

        let tensor = pad_to::<NdArray>(9, vec![vec![], vec![5, 6]], 3, &device);

        assert_eq!(
            tensor.into_data().convert::<i64>().value,
            vec![9, 9, 9, 5, 6, 9]
        );
    }
}
