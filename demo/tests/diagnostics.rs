use std::sync::Mutex;

use engine::Flow;
use log::{Level, LevelFilter, Log, Metadata, Record};
use shape_demo::{DemoConfig, ShapesDemo};

/// Collects every record logged by this crate.
struct Recorder {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Recorder {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target().starts_with("shape_demo")
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            if let Ok(mut records) = self.records.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder {
    records: Mutex::new(Vec::new()),
};

#[test]
fn unrecognised_key_is_reported_and_startup_help_is_info() {
    log::set_logger(&RECORDER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let mut demo = ShapesDemo::new(DemoConfig::default()).unwrap();
    let mut view = engine::ViewSettings::default();
    engine::Simulation::on_start(&mut demo, &mut view);
    assert_eq!(demo.dispatch('x'), Flow::Continue);
    assert_eq!(demo.dispatch('r'), Flow::Continue);

    let records = RECORDER.records.lock().unwrap().clone();
    let missed: Vec<_> = records
        .iter()
        .filter(|(_, message)| message.contains("key missed"))
        .collect();
    assert_eq!(missed.len(), 1, "{records:?}");
    assert_eq!(missed[0].0, Level::Warn);
    assert!(missed[0].1.contains("'x'"), "{}", missed[0].1);

    assert!(
        records
            .iter()
            .any(|(level, message)| *level == Level::Info && message.contains("'r' to reset")),
        "{records:?}"
    );
}
