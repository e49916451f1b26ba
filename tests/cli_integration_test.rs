//! CLI integration tests for the sweep command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_grid, build_axis, build_sweep_options, build_strategy)
//! - Data path resolution and adapter selection
//! - Full pipeline with MockDataPort and with real files on disk
//! - Exit codes for each error kind

mod common;

use clap::Parser;
use common::*;
use std::path::{Path, PathBuf};
use sweeptrader::adapters::file_config_adapter::FileConfigAdapter;
use sweeptrader::cli::{self, Cli, SweepOverrides};
use sweeptrader::domain::error::SweepError;
use sweeptrader::domain::grid::ParameterValue;
use sweeptrader::domain::strategy::EndOfDataPolicy;
use sweeptrader::ports::data_port::DataPort;

const VALID_INI: &str = r#"
[sweep]
strategy = bollinger_macd
data = prices.json
axes = bb_period, bb_mult, macd_fast, macd_slow, macd_signal
constraints = macd_fast < macd_slow
top_k = 3
progress_every = 0
parallel = false
end_of_data = discard

[strategy]
stop_loss = -0.015
take_profit = 0.03

[axis.bb_period]
start = 10
end = 20
step = 5

[axis.bb_mult]
values = 1.0, 1.5, 2.0

[axis.macd_fast]
start = 5
end = 15
step = 5

[axis.macd_slow]
start = 10
end = 20
step = 5

[axis.macd_signal]
values = 5
"#;

fn adapter(content: &str) -> FileConfigAdapter {
    FileConfigAdapter::from_string(content).unwrap()
}

mod config_building {
    use super::*;

    #[test]
    fn build_grid_from_valid_ini() {
        let grid = cli::build_grid(&adapter(VALID_INI)).unwrap();

        let names: Vec<&str> = grid.axes().iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["bb_period", "bb_mult", "macd_fast", "macd_slow", "macd_signal"]
        );
        assert_eq!(grid.cartesian_size(), 81);
        assert_eq!(grid.count_valid(), 54);
        assert_eq!(grid.constraints().len(), 1);
    }

    #[test]
    fn int_axis_keeps_integer_values() {
        let config = adapter("[axis.p]\nstart = 2\nend = 8\nstep = 3\n");
        let axis = cli::build_axis(&config, "p").unwrap();
        assert_eq!(
            axis.values(),
            &[
                ParameterValue::Int(2),
                ParameterValue::Int(5),
                ParameterValue::Int(8)
            ]
        );
    }

    #[test]
    fn decimal_bound_makes_float_axis() {
        let config = adapter("[axis.m]\nstart = 1.0\nend = 2\nstep = 0.5\n");
        let axis = cli::build_axis(&config, "m").unwrap();
        assert_eq!(axis.len(), 3);
        assert!(matches!(axis.values()[0], ParameterValue::Float(_)));
        assert!((axis.values()[2].as_f64() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn step_defaults_to_one() {
        let config = adapter("[axis.p]\nstart = 1\nend = 4\n");
        assert_eq!(cli::build_axis(&config, "p").unwrap().len(), 4);
    }

    #[test]
    fn value_list_mixes_kinds() {
        let config = adapter("[axis.v]\nvalues = 3, 0.5, -0.01\n");
        let axis = cli::build_axis(&config, "v").unwrap();
        assert_eq!(
            axis.values(),
            &[
                ParameterValue::Int(3),
                ParameterValue::Float(0.5),
                ParameterValue::Float(-0.01)
            ]
        );
    }

    #[test]
    fn missing_axis_section_names_key() {
        let err = cli::build_axis(&adapter("[sweep]\n"), "ghost").unwrap_err();
        assert!(
            matches!(err, SweepError::ConfigMissing { ref section, ref key } if section == "axis.ghost" && key == "start")
        );
        assert_eq!(err.to_string(), "missing config key [axis.ghost] start");
    }

    #[test]
    fn build_sweep_options_reads_sweep_section() {
        let options = cli::build_sweep_options(&adapter(VALID_INI)).unwrap();
        assert_eq!(options.top_k, 3);
        assert_eq!(options.progress_every, None);
        assert!(!options.parallel);
        assert_eq!(options.end_of_data, Some(EndOfDataPolicy::Discard));
    }

    #[test]
    fn build_sweep_options_defaults() {
        let options = cli::build_sweep_options(&adapter("[sweep]\n")).unwrap();
        assert_eq!(options.top_k, 10);
        assert_eq!(options.progress_every, Some(1000));
        assert!(options.parallel);
        assert_eq!(options.end_of_data, None);
    }

    #[test]
    fn build_strategy_uses_strategy_section() {
        let strategy = cli::build_strategy(&adapter(VALID_INI)).unwrap();
        assert_eq!(strategy.name(), "bollinger_macd");
    }

    #[test]
    fn build_strategy_ema_crossover() {
        let strategy =
            cli::build_strategy(&adapter("[sweep]\nstrategy = ema_crossover\n")).unwrap();
        assert_eq!(strategy.name(), "ema_crossover");
        assert_eq!(strategy.required_axes().len(), 6);
    }

    #[test]
    fn build_strategy_unknown_name() {
        let err = cli::build_strategy(&adapter("[sweep]\nstrategy = momentum\n"))
            .err()
            .unwrap();
        assert!(matches!(err, SweepError::UnknownStrategy { name } if name == "momentum"));
    }
}

mod data_resolution {
    use super::*;

    #[test]
    fn override_wins() {
        let path = cli::resolve_data_path(
            &adapter(VALID_INI),
            Path::new("/cfg/sweep.ini"),
            Some(Path::new("other.csv")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("other.csv"));
    }

    #[test]
    fn relative_data_resolves_against_config_dir() {
        let path =
            cli::resolve_data_path(&adapter(VALID_INI), Path::new("/cfg/sweep.ini"), None).unwrap();
        assert_eq!(path, PathBuf::from("/cfg/prices.json"));
    }

    #[test]
    fn missing_data_key_is_config_error() {
        let err = cli::resolve_data_path(&adapter("[sweep]\n"), Path::new("s.ini"), None)
            .unwrap_err();
        assert!(matches!(err, SweepError::ConfigMissing { key, .. } if key == "data"));
    }

    #[test]
    fn csv_extension_selects_csv_adapter() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n1,1,1,1,5,1\n2,1,1,1,6,1\n",
            ".CSV",
        );
        let series = cli::data_port_for(file.path()).load_series(file.path()).unwrap();
        assert_eq!(series.closes(), &[5.0, 6.0]);
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn mock_pipeline_runs_sweep() {
        let port = MockDataPort::new(candles_from_closes(&wavy_closes(200)));
        let report = cli::run_sweep_pipeline(
            &adapter(VALID_INI),
            &port,
            Path::new("prices.json"),
            &SweepOverrides::default(),
        )
        .unwrap();

        assert_eq!(port.loads.get(), 1);
        assert_eq!(report.strategy, "bollinger_macd");
        assert_eq!(report.cartesian_size, 81);
        assert_eq!(report.evaluated, 54);
        assert_eq!(report.top_k, 3);
        assert!(report.top().len() <= 3);
    }

    #[test]
    fn overrides_replace_config_values() {
        let port = MockDataPort::new(candles_from_closes(&wavy_closes(120)));
        let config = VALID_INI.replace("parallel = false", "parallel = true");
        let report = cli::run_sweep_pipeline(
            &adapter(&config),
            &port,
            Path::new("prices.json"),
            &SweepOverrides {
                top: Some(7),
                sequential: true,
            },
        )
        .unwrap();
        assert_eq!(report.top_k, 7);
    }

    #[test]
    fn invalid_config_fails_before_loading_data() {
        let port = MockDataPort::new(candles_from_closes(&wavy_closes(50)));
        let config = VALID_INI.replace("top_k = 3", "top_k = 0");
        let err = cli::run_sweep_pipeline(
            &adapter(&config),
            &port,
            Path::new("prices.json"),
            &SweepOverrides::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SweepError::ConfigInvalid { key, .. } if key == "top_k"));
        assert_eq!(port.loads.get(), 0);
    }

    #[test]
    fn malformed_data_is_fatal() {
        let port = MockDataPort::failing("record 3 has no numeric close");
        let err = cli::run_sweep_pipeline(
            &adapter(VALID_INI),
            &port,
            Path::new("prices.json"),
            &SweepOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::MalformedInput { .. }));
        assert!(err.to_string().contains("record 3"));
    }

    #[test]
    fn data_port_trait_object_loads_series() {
        let port: &dyn DataPort = &MockDataPort::new(candles_from_closes(&[1.0, 2.0]));
        assert_eq!(port.load_series(Path::new("x")).unwrap().len(), 2);
    }
}

mod end_to_end {
    use super::*;

    fn run_cli(args: &[&str]) -> Result<(), SweepError> {
        cli::execute(Cli::parse_from(args))
    }

    fn exit_status(args: &[&str]) -> u8 {
        run_cli(args).err().map_or(0, |e| e.exit_status())
    }

    #[test]
    fn sweep_writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = candles_json(&candles_from_closes(&wavy_closes(150)));
        std::fs::write(dir.path().join("prices.json"), data).unwrap();
        let config_path = dir.path().join("sweep.ini");
        std::fs::write(&config_path, VALID_INI).unwrap();
        let output = dir.path().join("report.json");

        run_cli(&[
            "sweeptrader",
            "sweep",
            "--config",
            config_path.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--top",
            "2",
        ])
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["evaluated"], 54);
        assert_eq!(json["pruned"], 27);
        assert!(json["top"].as_array().unwrap().len() <= 2);
    }

    #[test]
    fn validate_accepts_valid_config() {
        let file = write_temp(VALID_INI, ".ini");
        run_cli(&["sweeptrader", "validate", "--config", file.path().to_str().unwrap()]).unwrap();
    }

    #[test]
    fn validate_rejects_bad_config_with_exit_code_2() {
        let file = write_temp(&VALID_INI.replace("end_of_data = discard", "end_of_data = hold"), ".ini");
        assert_eq!(exit_status(&["sweeptrader", "validate", "--config", file.path().to_str().unwrap()]), 2);
    }

    #[test]
    fn huge_axis_range_exits_with_2() {
        let config = VALID_INI.replace(
            "[axis.bb_mult]\nvalues = 1.0, 1.5, 2.0",
            "[axis.bb_mult]\nstart = 0.0\nend = 1e30",
        );
        let file = write_temp(&config, ".ini");
        assert_eq!(exit_status(&["sweeptrader", "validate", "--config", file.path().to_str().unwrap()]), 2);
    }

    #[test]
    fn oversized_grid_exits_with_2() {
        let config = VALID_INI
            .replace("start = 10\nend = 20\nstep = 5", "start = 1\nend = 200000")
            .replace("start = 5\nend = 15\nstep = 5", "start = 1\nend = 200000");
        let file = write_temp(&config, ".ini");
        assert_eq!(exit_status(&["sweeptrader", "validate", "--config", file.path().to_str().unwrap()]), 2);
    }

    #[test]
    fn missing_config_file_is_config_error() {
        assert_eq!(exit_status(&["sweeptrader", "validate", "--config", "/nonexistent/sweep.ini"]), 2);
    }

    #[test]
    fn unknown_strategy_exits_with_4() {
        let file = write_temp(&VALID_INI.replace("= bollinger_macd", "= momentum"), ".ini");
        assert_eq!(exit_status(&["sweeptrader", "validate", "--config", file.path().to_str().unwrap()]), 4);
    }

    #[test]
    fn malformed_data_exits_with_3() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prices.json"), r#"[{"timestamp": 1, "open": 2}]"#).unwrap();
        let config_path = dir.path().join("sweep.ini");
        std::fs::write(&config_path, VALID_INI).unwrap();

        assert_eq!(exit_status(&["sweeptrader", "sweep", "--config", config_path.to_str().unwrap()]), 3);
    }

    #[test]
    fn missing_data_file_exits_with_1() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("sweep.ini");
        std::fs::write(&config_path, VALID_INI).unwrap();

        assert_eq!(exit_status(&["sweeptrader", "sweep", "--config", config_path.to_str().unwrap()]), 1);
    }

    #[test]
    fn info_reports_csv_file() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n1704067200000,1,1,1,1,1\n",
            ".csv",
        );
        run_cli(&["sweeptrader", "info", "--data", file.path().to_str().unwrap()]).unwrap();
    }

    #[test]
    fn timestamps_format_as_utc() {
        assert_eq!(cli::format_timestamp(1_704_067_200_000), "2024-01-01 00:00:00");
        assert_eq!(cli::format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}
