use std::cell::RefCell;
use std::time::Duration;

use cadence_core::{CallbackUnit, Engine, Sequence};
use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static WARNINGS: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

/// Captures warnings per thread so parallel tests do not see each other.
struct Capture;

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;

fn captured() -> Vec<String> {
    let _ = log::set_logger(&CAPTURE);
    log::set_max_level(LevelFilter::Warn);
    WARNINGS.with(|w| w.borrow_mut().drain(..).collect())
}

fn done_warnings(all: &[String]) -> usize {
    all.iter().filter(|m| m.contains("Done handle")).count()
}

#[tokio::test(start_paused = true)]
async fn panic_unwinding_a_done_handle_is_not_warned() {
    captured();
    let mut seq = Sequence::serial([CallbackUnit::new(|_done, _| panic!("host exploded")).into()]);
    Engine::default().run(&mut seq).await.expect_err("rejected");

    assert_eq!(done_warnings(&captured()), 0);
}

#[tokio::test(start_paused = true)]
async fn plain_drop_of_a_done_handle_is_warned() {
    captured();
    let mut seq = Sequence::serial([CallbackUnit::new(|done, _| drop(done)).into()]);
    let engine = Engine::default();
    let pending = tokio::time::timeout(Duration::from_secs(1), engine.run(&mut seq)).await;
    assert!(pending.is_err(), "unit should stay pending");

    assert_eq!(done_warnings(&captured()), 1);
}
