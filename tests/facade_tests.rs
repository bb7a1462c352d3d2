use sitelog::internal::config::{ConfigSource, LogOutput, SourceScope};
use sitelog::internal::logger::CONFIG_IDENTITY;
use sitelog::{Facade, FacadeOptions, Level, MemorySink, RecordLine};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    /// Helper to write a config file into a temp dir
    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("Failed to write config file");
        path
    }

    /// Helper to build an isolated facade that records into memory
    fn build(sources: Vec<ConfigSource>) -> (Facade, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let options = FacadeOptions::default()
            .with_sources(sources)
            .with_sink(sink.clone())
            .without_env()
            .without_tracing_bridge();
        (Facade::build(options), sink)
    }

    fn parsed(sink: &MemorySink) -> Vec<RecordLine> {
        sink.lines()
            .iter()
            .map(|line| RecordLine::parse(line).expect("line should parse"))
            .collect()
    }

    // ==================== threshold scenarios ====================

    #[test]
    fn test_warning_threshold_drops_debug() {
        let dir = TempDir::new().unwrap();
        let system = write_config(&dir, "system.conf", r#"{"log_level": "WARNING"}"#);
        let (facade, sink) = build(vec![ConfigSource::new(SourceScope::System, system)]);

        sitelog::debug!(logger: &facade, "x");
        let line = line!() + 1;
        sitelog::warning!(logger: &facade, "y");

        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warning);
        assert_eq!(records[0].message, "y");
        assert_eq!(
            records[0].identity,
            format!("{}:test_warning_threshold_drops_debug:{}", module_path!(), line)
        );
        assert!(sink.lines()[0].contains(" - WARNING - y"));
    }

    #[test]
    fn test_missing_user_source_keeps_system_level() {
        let dir = TempDir::new().unwrap();
        let system = write_config(&dir, "system.conf", r#"{"log_level": "INFO"}"#);
        let user = dir.path().join("absent.conf");
        let (facade, sink) = build(vec![
            ConfigSource::new(SourceScope::System, system),
            ConfigSource::new(SourceScope::User, user),
        ]);

        assert_eq!(facade.threshold(), Level::Info);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_user_source_overrides_system_level() {
        let dir = TempDir::new().unwrap();
        let system = write_config(&dir, "system.conf", r#"{"log_level": "DEBUG"}"#);
        let user = write_config(&dir, "user.conf", r#"{"log_level": "ERROR"}"#);
        let (facade, _) = build(vec![
            ConfigSource::new(SourceScope::System, system),
            ConfigSource::new(SourceScope::User, user),
        ]);

        assert_eq!(facade.threshold(), Level::Error);
    }

    #[test]
    fn test_no_sources_defaults_to_debug() {
        let (facade, _) = build(Vec::new());
        assert_eq!(facade.threshold(), Level::Debug);
        assert_eq!(facade.settings().log_level, "DEBUG");
    }

    #[test]
    fn test_emission_iff_level_at_or_above_threshold() {
        for threshold in Level::ALL {
            let sink = Arc::new(MemorySink::new());
            let facade = Facade::new(threshold, sink.clone());

            sitelog::debug!(logger: &facade, "d");
            sitelog::info!(logger: &facade, "i");
            sitelog::warning!(logger: &facade, "w");
            sitelog::error!(logger: &facade, "e");

            let levels: Vec<Level> = parsed(&sink).into_iter().map(|r| r.level).collect();
            let expected: Vec<Level> = Level::ALL.into_iter().filter(|l| *l >= threshold).collect();
            assert_eq!(levels, expected);
        }
    }

    // ==================== configuration problems ====================

    #[test]
    fn test_malformed_source_is_reported_and_skipped() {
        let dir = TempDir::new().unwrap();
        let system = write_config(&dir, "system.conf", r#"{"log_level": "INFO", "lang": "en-us"}"#);
        let user = write_config(&dir, "user.conf", "{ log_level: ");
        let (facade, sink) = build(vec![
            ConfigSource::new(SourceScope::System, system),
            ConfigSource::new(SourceScope::User, user),
        ]);

        assert_eq!(facade.threshold(), Level::Info);
        assert_eq!(facade.config().get("lang").and_then(|v| v.as_str()), Some("en-us"));

        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identity, CONFIG_IDENTITY);
        assert_eq!(records[0].level, Level::Warning);
        assert!(records[0].message.contains("user.conf"));
    }

    #[test]
    fn test_unknown_level_falls_back_to_debug() {
        let dir = TempDir::new().unwrap();
        let system = write_config(&dir, "system.conf", r#"{"log_level": "LOUD"}"#);
        let (facade, sink) = build(vec![ConfigSource::new(SourceScope::System, system)]);

        assert_eq!(facade.threshold(), Level::Debug);
        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert!(records[0].message.contains("LOUD"));
    }

    #[test]
    fn test_bad_output_does_not_discard_level() {
        for output in [r#""file""#, "null"] {
            let dir = TempDir::new().unwrap();
            let system = write_config(
                &dir,
                "system.conf",
                &format!(r#"{{"log_level": "ERROR", "log_output": {}}}"#, output),
            );
            let (facade, sink) = build(vec![ConfigSource::new(SourceScope::System, system)]);

            assert_eq!(facade.threshold(), Level::Error);
            assert_eq!(facade.settings().log_level, "ERROR");
            assert_eq!(facade.settings().log_output, LogOutput::Stdout);
            // The WARNING note is below the ERROR threshold.
            assert!(sink.is_empty());
        }
    }

    #[test]
    fn test_bad_output_is_reported_when_visible() {
        let dir = TempDir::new().unwrap();
        let system = write_config(
            &dir,
            "system.conf",
            r#"{"log_level": "WARNING", "log_output": "file"}"#,
        );
        let (facade, sink) = build(vec![ConfigSource::new(SourceScope::System, system)]);

        assert_eq!(facade.threshold(), Level::Warning);
        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identity, CONFIG_IDENTITY);
        assert!(records[0].message.contains("log_output"));
    }

    #[test]
    fn test_bad_output_from_environment_keeps_file_level() {
        std::env::set_var("SITELOG_FACADE_TEST_LOG_OUTPUT", "bogus");

        let dir = TempDir::new().unwrap();
        let system = write_config(&dir, "system.conf", r#"{"log_level": "INFO"}"#);
        let sink = Arc::new(MemorySink::new());
        let options = FacadeOptions::default()
            .with_sources(vec![ConfigSource::new(SourceScope::System, system)])
            .with_sink(sink.clone())
            .with_env_prefix("SITELOG_FACADE_TEST")
            .without_tracing_bridge();
        let facade = Facade::build(options);

        std::env::remove_var("SITELOG_FACADE_TEST_LOG_OUTPUT");

        assert_eq!(facade.threshold(), Level::Info);
        assert_eq!(facade.settings().log_output, LogOutput::Stdout);
        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert!(records[0].message.contains("log_output"));
    }

    #[test]
    fn test_commented_config_is_accepted() {
        let dir = TempDir::new().unwrap();
        let system = write_config(
            &dir,
            "system.conf",
            "// system defaults\n{\n  # verbosity\n  \"log_level\": \"ERROR\" /* quiet */\n}\n",
        );
        let (facade, sink) = build(vec![ConfigSource::new(SourceScope::System, system)]);

        assert_eq!(facade.threshold(), Level::Error);
        assert!(sink.is_empty());
    }

    // ==================== identity ====================

    #[test]
    fn test_site_identity_is_stable_within_a_loop() {
        let sink = Arc::new(MemorySink::new());
        let facade = Facade::new(Level::Debug, sink.clone());

        for i in 0..2 {
            sitelog::info!(logger: &facade, "pass {}", i);
        }

        let records = parsed(&sink);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity, records[1].identity);
        assert!(records[0]
            .identity
            .starts_with(&format!("{}:test_site_identity_is_stable_within_a_loop:", module_path!())));
        assert_eq!(records[1].message, "pass 1");
    }

    #[test]
    fn test_pending_name_applies_to_exactly_one_emission() {
        let sink = Arc::new(MemorySink::new());
        let facade = Facade::new(Level::Debug, sink.clone());

        sitelog::debug!(logger: facade.name_next("custom_name"), "Another message");
        sitelog::debug!(logger: &facade, "back to site");

        let records = parsed(&sink);
        assert_eq!(records[0].identity, "custom_name");
        assert_eq!(records[0].message, "Another message");
        assert_ne!(records[1].identity, "custom_name");
        assert!(records[1].identity.contains(":test_pending_name_applies_to_exactly_one_emission:"));
    }

    #[test]
    fn test_pending_name_is_not_taken_by_other_threads() {
        let sink = Arc::new(MemorySink::new());
        let facade = Arc::new(Facade::new(Level::Debug, sink.clone()));

        facade.name_next("mine");
        let other = Arc::clone(&facade);
        thread::spawn(move || sitelog::info!(logger: other, "from worker"))
            .join()
            .unwrap();
        sitelog::info!(logger: facade, "from owner");

        let records = parsed(&sink);
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].identity, "mine");
        assert_eq!(records[1].identity, "mine");
    }

    #[test]
    fn test_call_scoped_name_and_named_logger() {
        let sink = Arc::new(MemorySink::new());
        let facade = Facade::new(Level::Debug, sink.clone());
        let skill = String::from("skill.weather");

        sitelog::info!(logger: &facade, name: skill, "temp={temp}", temp = 21);
        facade.named("audio").warning(format_args!("underrun on {}", "hw:0"));

        let records = parsed(&sink);
        assert_eq!(records[0].identity, "skill.weather");
        assert_eq!(records[0].message, "temp=21");
        assert_eq!(records[1].identity, "audio");
        assert_eq!(records[1].level, Level::Warning);
    }

    #[test]
    fn test_round_trip_recovers_level_and_identity() {
        let sink = Arc::new(MemorySink::new());
        let facade = Facade::new(Level::Debug, sink.clone());

        sitelog::error!(logger: &facade, name: "tts", "{} of {} chunks failed", 2, 5);

        let record = RecordLine::parse(&sink.lines()[0]).unwrap();
        assert_eq!(record.level.as_str(), "ERROR");
        assert_eq!(record.identity, "tts");
        assert_eq!(record.message, "2 of 5 chunks failed");
    }

    // ==================== registry ====================

    #[test]
    fn test_root_handle_exists_before_any_emission() {
        let facade = Facade::new(Level::Info, Arc::new(MemorySink::new()));
        assert_eq!(facade.registry().len(), 1);
        assert_eq!(facade.root().identity(), "");
        assert_eq!(facade.root().threshold(), Level::Info);
    }

    #[test]
    fn test_registry_caches_per_identity() {
        let sink = Arc::new(MemorySink::new());
        let facade = Facade::new(Level::Debug, sink.clone());

        for _ in 0..3 {
            sitelog::info!(logger: &facade, name: "a", "one");
            sitelog::info!(logger: &facade, name: "b", "two");
        }

        // root + "a" + "b"
        assert_eq!(facade.registry().created(), 3);
        assert_eq!(sink.len(), 6);
    }

    #[test]
    fn test_dropped_records_do_not_create_handles() {
        let facade = Facade::new(Level::Warning, Arc::new(MemorySink::new()));

        for id in 0..5 {
            sitelog::info!(logger: &facade, name: format!("req-{}", id), "ignored");
        }
        assert_eq!(facade.registry().len(), 1);

        // A pending name is still consumed by a dropped record.
        sitelog::debug!(logger: facade.name_next("pending"), "ignored");
        sitelog::warning!(logger: &facade, "kept");
        assert!(facade.registry().get("pending").is_none());
        assert_eq!(facade.registry().len(), 2);
    }

    // ==================== exception ====================

    #[derive(Debug, thiserror::Error)]
    #[error("synthesis failed")]
    struct SynthesisError {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_exception_appends_error_chain() {
        let sink = Arc::new(MemorySink::new());
        let facade = Facade::new(Level::Warning, sink.clone());
        let err = SynthesisError {
            source: io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"),
        };

        sitelog::exception!(logger: &facade, name: "tts", err, "could not speak {:?}", "hello");

        let record = RecordLine::parse(&sink.lines()[0]).unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.identity, "tts");
        let mut lines = record.message.lines();
        assert_eq!(lines.next(), Some("could not speak \"hello\""));
        assert_eq!(lines.next(), Some("Error: synthesis failed"));
        assert_eq!(lines.next(), Some("Caused by: connection reset"));
    }

    // ==================== sink failures ====================

    #[derive(Debug)]
    struct ClosedSink;

    impl sitelog::Sink for ClosedSink {
        fn write_line(&self, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_sink_failure_drops_record_and_counts() {
        let facade = Facade::new(Level::Debug, Arc::new(ClosedSink));

        sitelog::info!(logger: &facade, "lost");
        sitelog::debug!(logger: &facade, "lost too");

        assert_eq!(facade.write_failures(), 2);
    }
}
