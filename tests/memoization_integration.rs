//! Integration tests for memoized computations over plain and tracked arguments.

use std::cell::Cell;

use serde::Serialize;

use lazymemo::{
    computation, Arguments, CallArgs, Memo, MemoError, MemoResult, RecordedCall, Structural,
    Textual, Trackable, Tracked,
};

/// Running total whose `add` calls are deferred.
#[derive(Debug, Default)]
struct Total {
    value: i64,
    applied: Vec<i64>,
}

impl Trackable for Total {
    const OPERATIONS: &'static [&'static str] = &["add"];

    fn apply(&mut self, call: &RecordedCall) -> MemoResult<()> {
        match call.operation() {
            "add" => {
                let n: i64 = call.arg(0)?;
                self.value += n;
                self.applied.push(n);
                Ok(())
            }
            _ => Err(call.unsupported::<Self>()),
        }
    }
}

fn add_all(memo: &Memo, total: &Tracked<Total>, values: &[i64]) {
    let add = memo.mutating::<Total>("add").unwrap();
    for value in values {
        add.call(total, (value,)).unwrap();
    }
}

#[test]
fn test_square_runs_once_per_argument() {
    let memo = Memo::in_memory();
    let ran = Cell::new(false);
    let square = memo.memoize(computation!("square"), |&(x,): &(&i64,)| -> MemoResult<i64> {
        ran.set(true);
        Ok(x * x)
    });

    assert_eq!(square.call((&1,)).unwrap(), 1);
    assert_eq!(square.call((&2,)).unwrap(), 4);

    ran.set(false);
    assert_eq!(square.call((&0,)).unwrap(), 0);
    assert!(ran.get());

    ran.set(false);
    assert_eq!(square.call((&0,)).unwrap(), 0);
    assert!(!ran.get());
}

#[cfg(feature = "sqlite")]
#[test]
fn test_results_survive_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("cache.db");
    let runs = Cell::new(0);

    let run_once = |expect_runs: usize| {
        let memo = Memo::open(&path).unwrap();
        let square = memo.memoize(computation!("square"), |&(x,): &(&i64,)| -> MemoResult<i64> {
            runs.set(runs.get() + 1);
            Ok(x * x)
        });
        assert_eq!(square.call((&7,)).unwrap(), 49);
        assert_eq!(runs.get(), expect_runs);
        memo.close().unwrap();
    };

    run_once(1);
    run_once(1);

    std::fs::remove_file(&path).unwrap();
    run_once(2);
}

#[cfg(feature = "sqlite")]
#[test]
fn test_tracked_history_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("cache.db");
    let runs = Cell::new(0);

    for _ in 0..2 {
        let memo = Memo::open(&path).unwrap();
        memo.register::<Total>();
        let get_value = memo.memoize(
            computation!("get_value"),
            |&(t,): &(&Tracked<Total>,)| -> MemoResult<i64> {
                runs.set(runs.get() + 1);
                Ok(t.peek()?.value)
            },
        );

        let total = Tracked::new(Total::default());
        add_all(&memo, &total, &[5, 6]);
        assert_eq!(get_value.call((&total,)).unwrap(), 11);
        memo.close().unwrap();
    }

    assert_eq!(runs.get(), 1);
}

#[test]
fn test_equal_histories_share_results() {
    let memo = Memo::in_memory();
    memo.register::<Total>();
    let ran = Cell::new(false);
    let get_value = memo.memoize(
        computation!("get_value"),
        |&(t,): &(&Tracked<Total>,)| -> MemoResult<i64> {
            ran.set(true);
            Ok(t.peek()?.value)
        },
    );

    let a = Tracked::new(Total::default());
    add_all(&memo, &a, &[1, 2, 3]);
    assert_eq!(get_value.call((&a,)).unwrap(), 6);
    assert!(ran.get());

    ran.set(false);
    let b = Tracked::new(Total::default());
    add_all(&memo, &b, &[1, 2, 3]);
    assert_eq!(get_value.call((&b,)).unwrap(), 6);
    assert!(!ran.get());

    // Served from the store: b's mutations were never applied.
    assert!(b.peek().unwrap().applied.is_empty());
    assert_eq!(memo.pending_len(&b), 3);

    add_all(&memo, &b, &[4]);
    assert_eq!(get_value.call((&b,)).unwrap(), 10);
    assert!(ran.get());
    assert_eq!(b.peek().unwrap().applied, vec![1, 2, 3, 4]);
}

#[test]
fn test_mutations_are_lazy_and_ordered() {
    let memo = Memo::in_memory();
    memo.register::<Total>();
    let total = Tracked::new(Total::default());

    add_all(&memo, &total, &[3, 1, 2]);
    assert!(total.peek().unwrap().applied.is_empty());
    assert_eq!(memo.stats().recorded_calls, 3);

    let get_value = memo.memoize(
        computation!("get_value"),
        |&(t,): &(&Tracked<Total>,)| -> MemoResult<i64> { Ok(t.peek()?.value) },
    );
    assert_eq!(get_value.call((&total,)).unwrap(), 6);
    assert_eq!(total.peek().unwrap().applied, vec![3, 1, 2]);

    get_value.call((&total,)).unwrap();
    assert_eq!(total.peek().unwrap().applied.len(), 3);
    assert_eq!(memo.stats().replayed_calls, 3);
}

#[test]
fn test_nested_memoization_through_tracked_argument() {
    let memo = Memo::in_memory();
    memo.register::<Total>();
    let inner_runs = Cell::new(0);
    let outer_runs = Cell::new(0);

    let get_value = memo.memoize(
        computation!("get_value"),
        |&(t,): &(&Tracked<Total>,)| -> MemoResult<i64> {
            inner_runs.set(inner_runs.get() + 1);
            Ok(t.peek()?.value)
        },
    );
    let square = memo.memoize(
        computation!("square"),
        |&(t,): &(&Tracked<Total>,)| -> MemoResult<i64> {
            outer_runs.set(outer_runs.get() + 1);
            let value = get_value.call((t,))?;
            Ok(value * value)
        },
    );

    let total = Tracked::new(Total::default());
    add_all(&memo, &total, &[1, 1]);

    assert_eq!(square.call((&total,)).unwrap(), 4);
    assert_eq!((inner_runs.get(), outer_runs.get()), (1, 1));
    assert_eq!(memo.stats().replayed_calls, 2);

    assert_eq!(square.call((&total,)).unwrap(), 4);
    assert_eq!((inner_runs.get(), outer_runs.get()), (1, 1));
    assert_eq!(memo.stats().replayed_calls, 2);
}

#[test]
fn test_failed_computation_is_retried() {
    #[derive(Debug)]
    enum JobError {
        Memo(MemoError),
        Flaky,
    }

    impl From<MemoError> for JobError {
        fn from(err: MemoError) -> Self {
            JobError::Memo(err)
        }
    }

    let memo = Memo::in_memory();
    let attempts = Cell::new(0);
    let job = memo.memoize(computation!("job"), |&(x,): &(&i64,)| -> Result<i64, JobError> {
        attempts.set(attempts.get() + 1);
        if attempts.get() == 1 {
            return Err(JobError::Flaky);
        }
        Ok(x + 1)
    });

    assert!(matches!(job.call((&1,)), Err(JobError::Flaky)));
    assert_eq!(memo.stored_len().unwrap(), 0);

    assert_eq!(job.call((&1,)).unwrap(), 2);
    assert_eq!(job.call((&1,)).unwrap(), 2);
    assert_eq!(attempts.get(), 2);
    assert!(!matches!(job.call((&1,)), Err(JobError::Memo(_))));
}

#[test]
fn test_unregistered_tracked_argument_is_rejected() {
    let memo = Memo::in_memory();
    let runs = Cell::new(0);
    let get_value = memo.memoize(
        computation!("get_value"),
        |&(t,): &(&Tracked<Total>,)| -> MemoResult<i64> {
            runs.set(runs.get() + 1);
            Ok(t.peek()?.value)
        },
    );

    let total = Tracked::new(Total::default());
    let err = get_value.call((&total,)).unwrap_err();
    assert!(matches!(err, MemoError::UnregisteredClass(_)));
    assert_eq!(runs.get(), 0);
}

struct Window<'a> {
    series: &'a Vec<i64>,
    size: usize,
}

impl Arguments for Window<'_> {
    fn describe(&self) -> CallArgs<'_> {
        CallArgs::new().arg(self.series).kwarg("size", &self.size)
    }
}

#[test]
fn test_keyword_arguments_through_struct() {
    let memo = Memo::in_memory();
    let runs = Cell::new(0);
    let widest = memo.memoize(computation!("widest"), |w: &Window<'_>| -> MemoResult<i64> {
        runs.set(runs.get() + 1);
        Ok(w
            .series
            .windows(w.size)
            .map(|win| win.iter().sum::<i64>())
            .max()
            .unwrap_or(0))
    });

    let series = vec![1, 5, 2, 8];
    assert_eq!(widest.call(Window { series: &series, size: 2 }).unwrap(), 10);
    assert_eq!(widest.call(Window { series: &series, size: 2 }).unwrap(), 10);
    assert_eq!(widest.call(Window { series: &series, size: 3 }).unwrap(), 15);
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_structural_and_textual_arguments() {
    #[derive(Debug, Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let memo = Memo::in_memory();
    let runs = Cell::new(0);
    let id = computation!("describe");

    let call = |point: Point| -> MemoResult<String> {
        let structural = Structural(point);
        let label = Textual(("origin", 0u8));
        let args = CallArgs::new().arg(&structural).kwarg("label", &label);
        memo.invoke(&id, &args, || {
            runs.set(runs.get() + 1);
            Ok(format!("{},{}", structural.0.x, structural.0.y))
        })
    };

    assert_eq!(call(Point { x: 1, y: 2 }).unwrap(), "1,2");
    assert_eq!(call(Point { x: 1, y: 2 }).unwrap(), "1,2");
    assert_eq!(call(Point { x: 2, y: 1 }).unwrap(), "2,1");
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_forcing_boundary_replays_without_caching() {
    let memo = Memo::in_memory();
    memo.register::<Total>();
    let reads = Cell::new(0);
    let read = memo.forcing(|&(t,): &(&Tracked<Total>,)| -> MemoResult<i64> {
        reads.set(reads.get() + 1);
        Ok(t.peek()?.value)
    });

    let total = Tracked::new(Total::default());
    add_all(&memo, &total, &[2, 3]);

    assert_eq!(read.call((&total,)).unwrap(), 5);
    assert_eq!(read.call((&total,)).unwrap(), 5);
    assert_eq!(reads.get(), 2);
    assert_eq!(memo.stored_len().unwrap(), 0);
}

#[cfg(feature = "sqlite")]
#[test]
fn test_unavailable_store_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let err = Memo::open(blocker.join("cache.db")).err().unwrap();
    assert!(matches!(err, MemoError::Io(_) | MemoError::Store(_)));
}

#[test]
fn test_unsignable_argument_fails_before_running() {
    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("opaque values have no canonical form"))
        }
    }

    let memo = Memo::in_memory();
    let id = computation!("inspect");
    let runs = Cell::new(0);
    let opaque = Structural(Opaque);

    let result: MemoResult<i64> = memo.invoke(&id, &CallArgs::new().arg(&opaque), || {
        runs.set(runs.get() + 1);
        Ok(1)
    });

    assert!(matches!(result, Err(MemoError::SignatureResolution(_))));
    assert_eq!(runs.get(), 0);
    assert_eq!(memo.stored_len().unwrap(), 0);
    assert_eq!(memo.stats().misses, 0);
}
