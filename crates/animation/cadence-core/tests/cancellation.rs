use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cadence_core::{
    CallbackUnit, CancellationToken, Done, Engine, PromiseUnit, Sequence, SequenceError,
    TimedUnit, Unit,
};

type Log = Rc<RefCell<Vec<String>>>;

fn timed(log: &Log, name: &'static str, duration: f64) -> Unit {
    let (on_start, on_complete) = (log.clone(), log.clone());
    TimedUnit::new(duration)
        .on_start(move |_, _| on_start.borrow_mut().push(format!("{name}:start")))
        .on_complete(move |_, _| on_complete.borrow_mut().push(format!("{name}:done")))
        .into()
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_sequence_stops_remaining_items() {
    let log: Log = Rc::default();
    let mut seq = Sequence::serial([
        timed(&log, "A", 0.1),
        timed(&log, "B", 1.0),
        timed(&log, "C", 0.1),
    ]);
    let engine = Engine::default();

    let (res, ()) = futures::join!(engine.run(&mut seq), async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        engine.cancel();
    });

    let err = res.expect_err("cancelled");
    assert!(matches!(err, SequenceError::Cancelled));
    assert_eq!(*log.borrow(), vec!["A:start", "A:done", "B:start"]);

    // a cancelled engine refuses new work
    let err = engine
        .run(&mut Sequence::serial([timed(&log, "D", 0.0)]))
        .await
        .expect_err("still cancelled");
    assert!(err.is_cancelled());
    assert!(!log.borrow().contains(&"D:start".to_string()));
}

#[tokio::test(start_paused = true)]
async fn pending_callback_hangs_until_cancelled() {
    let parked: Rc<RefCell<Option<Done>>> = Rc::default();
    let keep = parked.clone();
    let mut seq = Sequence::serial([CallbackUnit::new(move |done, _| {
        *keep.borrow_mut() = Some(done);
    })
    .into()]);

    let token = CancellationToken::new();
    let engine = Engine::default().with_cancellation(token.clone());

    let hung = tokio::time::timeout(Duration::from_secs(10), engine.run(&mut seq)).await;
    assert!(hung.is_err(), "no timeout exists inside the engine");
    assert!(parked.borrow().is_some());

    token.cancel();
    let err = engine.run(&mut seq).await.expect_err("cancelled");
    assert!(err.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn dropped_done_leaves_unit_pending() {
    let mut seq = Sequence::serial([CallbackUnit::new(|done, _| drop(done)).into()]);
    let engine = Engine::default();
    let hung = tokio::time::timeout(Duration::from_secs(5), engine.run(&mut seq)).await;
    assert!(hung.is_err());
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_promise_and_parallel_siblings() {
    let log: Log = Rc::default();
    let p_log = log.clone();
    let mut seq = Sequence::parallel([
        timed(&log, "A", 2.0),
        PromiseUnit::new(move |_| {
            let log = p_log.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                log.borrow_mut().push("P:done".into());
                Ok(())
            }
        })
        .into(),
    ]);
    let engine = Engine::default();
    let token = engine.cancellation_token();

    let started = tokio::time::Instant::now();
    let (res, ()) = futures::join!(engine.run(&mut seq), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });

    assert!(res.expect_err("cancelled").is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(*log.borrow(), vec!["A:start"]);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_delay() {
    let log: Log = Rc::default();
    let sink = log.clone();
    let mut seq = Sequence::serial([TimedUnit::new(0.1)
        .delay(3.0)
        .on_start(move |_, _| sink.borrow_mut().push("late:start".into()))
        .into()]);
    let engine = Engine::default();

    let (res, ()) = futures::join!(engine.run(&mut seq), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        engine.cancel();
    });

    assert!(res.expect_err("cancelled").is_cancelled());
    assert!(log.borrow().is_empty());
}
