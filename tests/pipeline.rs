use bpnet::{
    bp_train, err_rate, load_parameters, load_tab_delimited, predict, save_parameters,
    CostHistory, MinMaxScaler, Network, NoProgress, TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Write;

// Three well separated clusters with raw labels 1, 2 and 5.
fn write_clusters(path: &std::path::Path) {
    let centers = [(10.0, 200.0, 1), (30.0, 100.0, 2), (50.0, 300.0, 5)];
    let mut file = fs::File::create(path).unwrap();
    for (cx, cy, label) in centers {
        for k in 0..8 {
            let dx = (k % 3) as f64 - 1.0;
            let dy = (k / 3) as f64 * 5.0 - 5.0;
            writeln!(file, "{}\t{}\t{}", cx + dx, cy + dy, label).unwrap();
        }
    }
}

#[test]
fn train_save_reload_predict() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data.txt");
    write_clusters(&data_path);

    let data = load_tab_delimited(&data_path).unwrap();
    assert_eq!(data.n_samples(), 24);
    assert_eq!(data.classes, vec![1, 2, 5]);

    let (scaler, scaled) = MinMaxScaler::fit_transform(&data.features).unwrap();
    let config = TrainConfig::new(6, 1500, 0.5).with_n_output(3);
    let mut history = CostHistory::default();
    let (params, summary) = bp_train(
        &scaled,
        &data.labels,
        &config,
        &mut StdRng::seed_from_u64(7),
        &mut history,
    )
    .unwrap();
    assert!(summary.final_cost < history.points[0].1);

    // Plain-text parameter files.
    let model_dir = dir.path().join("model");
    save_parameters(&model_dir, &params).unwrap();
    let reloaded = load_parameters(&model_dir).unwrap();
    let before = predict(&params, &scaled).unwrap();
    let after = predict(&reloaded, &scaled).unwrap();
    for (a, b) in before.iter().zip(after.iter()) {
        assert!((a - b).abs() < 1e-9);
    }

    // Bundled network with label mapping and scaler.
    let net = Network::new(params)
        .with_classes(data.classes.clone())
        .unwrap()
        .with_scaler(scaler)
        .unwrap();
    let bundle = dir.path().join("net.pere");
    net.save_pere(&bundle).unwrap();
    let restored = Network::load_pere(&bundle).unwrap();
    assert_eq!(
        restored.classify(&data.features).unwrap(),
        net.classify(&data.features).unwrap()
    );
    assert_eq!(restored.evaluate(&data).unwrap(), net.evaluate(&data).unwrap());
}

#[test]
fn malformed_file_is_reported_with_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(&path, "1.0\t2.0\t0\n3.0\t0\n").unwrap();
    let err = load_tab_delimited(&path).unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn reloaded_model_reports_raw_labels_and_rescales() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data.txt");
    let rows: Vec<String> = [10.0, 14.0, 18.0, 22.0, 26.0, 74.0, 78.0, 82.0, 86.0, 90.0]
        .iter()
        .map(|x| format!("{x}\t{}", if *x < 50.0 { 1 } else { 2 }))
        .collect();
    fs::write(&data_path, rows.join("\n")).unwrap();
    let data = load_tab_delimited(&data_path).unwrap();
    assert_eq!(data.classes, vec![1, 2]);

    let (scaler, scaled) = MinMaxScaler::fit_transform(&data.features).unwrap();
    let config = TrainConfig::new(3, 2000, 0.5).with_n_output(2);
    let mut rng = StdRng::seed_from_u64(3);
    let (params, _) = bp_train(&scaled, &data.labels, &config, &mut rng, &mut NoProgress).unwrap();
    let train_rate = err_rate(&data.labels, &predict(&params, &scaled).unwrap()).unwrap();

    let model_dir = dir.path().join("model");
    Network::new(params)
        .with_classes(data.classes.clone())
        .unwrap()
        .with_scaler(scaler)
        .unwrap()
        .save_dir(&model_dir)
        .unwrap();

    let reloaded = Network::load_dir(&model_dir).unwrap();
    assert_eq!(reloaded.classes(), &[1, 2]);
    assert!(reloaded.scaler().is_some());
    assert_eq!(reloaded.evaluate(&data).unwrap(), train_rate);
}
