/// Build a [`NeuralNetwork`](crate::network::NeuralNetwork) from
/// `(input_size, output_size, activation)` triples.
///
/// Expands to [`NeuralNetwork::from_layers`](crate::network::NeuralNetwork::from_layers),
/// so the result is a `Result` that fails when consecutive sizes do not chain.
///
/// # Examples
///
/// ```
/// use tdq::activations::Activation;
/// use tdq::create_network;
/// use tdq::network::QNetwork;
///
/// let network = create_network!(
///     (4, 32, Activation::Relu),
///     (32, 2, Activation::Linear)
/// ).unwrap();
/// assert_eq!(network.num_actions(), 2);
/// ```
#[macro_export]
macro_rules! create_network {
    ($( ($input_size:expr, $output_size:expr, $activation:expr) ),+ $(,)?) => {
        $crate::network::NeuralNetwork::from_layers(vec![
            $( $crate::layers::DenseLayer::new($input_size, $output_size, $activation) ),+
        ])
    };
}
