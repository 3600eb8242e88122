use rr_model::{ModelParameters, transition_from_parameters};
use rr_project::SolverDef;
use rr_results::*;

#[test]
fn solved_transition_survives_the_cache() {
    let temp_dir = std::env::temp_dir().join("rr_results_solved_roundtrip");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let params = ModelParameters::default().with_nodes(21);
    let solver = SolverDef::default();
    let (steady, solution) =
        transition_from_parameters(&params, &solver.to_newton_config()).unwrap();

    let run_type = RunType::Transition { nodes: params.nodes };
    let run_id = compute_run_id("baseline", &params, &solver, &run_type, "test");
    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_name: "baseline".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        run_type,
        solver_version: "test".to_string(),
        parameters: params,
        steady_state: steady.state,
        residual_norm: solution.residual_norm,
        iterations: solution.iterations,
    };

    let store = RunStore::new(temp_dir).unwrap();
    store
        .save_run(&manifest, &path_records(&solution.path, &params))
        .unwrap();

    let records = store.load_path(&run_id).unwrap();
    assert_eq!(records.len(), 21);
    assert_eq!(records[0].capital, 6.0);

    let path = path_from_records(&records).unwrap();
    let terminal = path.as_slice()[path.terminal_consumption_index()];
    assert!((terminal - steady.state.consumption).abs() < 1e-6);
}
