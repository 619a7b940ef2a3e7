use ironnet::{
    ActivationFunction, Dense, Dropout, Layer, LossFunction, Matrix, Network, NnError, WeightInitialization,
};

fn sample_network() -> Network {
    let hidden = Dense::random(3, 4, ActivationFunction::SELU, WeightInitialization::XavierNormal);
    let output = Dense::random(4, 2, ActivationFunction::SoftmaxWithCCE, WeightInitialization::He);
    Network::new(
        vec![
            Layer::Dense(hidden),
            Layer::Dropout(Dropout::new(4, 0.25).unwrap()),
            Layer::Dense(output),
        ],
        LossFunction::cce_with_softmax(),
    )
    .unwrap()
}

#[test]
fn file_round_trip_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let original = sample_network();

    original.save_json(&path).unwrap();
    let restored = Network::load_json(&path).unwrap();

    assert_eq!(restored.loss().name(), original.loss().name());
    for (a, b) in original.layers().iter().zip(restored.layers()) {
        match (a, b) {
            (Layer::Dense(a), Layer::Dense(b)) => {
                assert_eq!(a.activation().name(), b.activation().name());
                for (x, y) in a.weights().data().iter().flatten().zip(b.weights().data().iter().flatten()) {
                    assert_eq!(x.to_bits(), y.to_bits());
                }
                for (x, y) in a.bias().data().iter().flatten().zip(b.bias().data().iter().flatten()) {
                    assert_eq!(x.to_bits(), y.to_bits());
                }
            }
            (Layer::Dropout(a), Layer::Dropout(b)) => assert_eq!(a, b),
            (a, b) => panic!("layer kinds differ: {a} vs {b}"),
        }
    }
    assert_eq!(restored, original);
}

#[test]
fn restored_network_predicts_identically() {
    let original = sample_network();
    let restored = Network::from_json_str(&original.to_json_string().unwrap()).unwrap();
    let x = Matrix::new(vec![vec![0.1, -0.3], vec![2.0, 0.5], vec![-1.2, 0.0]]).unwrap();
    assert_eq!(original.predict(&x).unwrap(), restored.predict(&x).unwrap());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(Network::load_json(dir.path().join("absent.json")), Err(NnError::Io(_))));
}

#[test]
fn malformed_json_is_a_json_error() {
    assert!(matches!(Network::from_json_str("{ \"Layers\": "), Err(NnError::Json(_))));
}

#[test]
fn ragged_weights_are_rejected() {
    let json = r#"{ "Layers": [ { "Weights": [[1.0, 2.0], [3.0]], "Bias": [[0.0], [0.0]],
                                  "Activation": "Linear", "Type": "Dense" } ],
                    "LossFunction": "SquareLoss" }"#;
    assert!(Network::from_json_str(json).is_err());
}
