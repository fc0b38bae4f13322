use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Pad or truncate every sequence to exactly `max_len` ids.
///
/// Both padding and truncation happen at the front, so the most recent tokens sit at the end
/// where the recurrent layer reads its final state. An empty sequence becomes all padding.
pub fn pad_sequences(pad_token: usize, sequences: &[Vec<usize>], max_len: usize) -> Vec<Vec<usize>> {
    sequences
        .iter()
        .map(|tokens| {
            let kept = &tokens[tokens.len().saturating_sub(max_len)..];

            let mut padded = vec![pad_token; max_len - kept.len()];
            padded.extend_from_slice(kept);

            padded
        })
        .collect()
}

/// Pad the sequences and pack them into a `[batch_size, max_len]` tensor
pub fn pad_to<B: Backend>(
    pad_token: usize,
    sequences: &[Vec<usize>],
    max_len: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = sequences.len();

    let values: Vec<B::IntElem> = pad_sequences(pad_token, sequences, max_len)
        .into_iter()
        .flatten()
        .map(|token| (token as i64).elem())
        .collect();

    Tensor::from_data(Data::new(values, Shape::new([batch_size, max_len])), device)
}

/// Pack binary labels into a float tensor of shape `[batch_size]`
pub fn labels_to<B: Backend>(labels: &[u8], device: &B::Device) -> Tensor<B, 1> {
    let values: Vec<B::FloatElem> = labels.iter().map(|label| (*label as f32).elem()).collect();

    Tensor::from_data(Data::new(values, Shape::new([labels.len()])), device)
}

/// Read a `[batch_size]` tensor back into plain floats
pub fn to_vec<B: Backend>(tensor: Tensor<B, 1>) -> Vec<f32> {
    tensor.into_data().convert::<f32>().value
}
