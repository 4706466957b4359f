mod common;

use std::sync::Arc;
use std::time::Duration;

use fieldtasks::connectivity::ConnectivityFlag;
use fieldtasks::db::TaskStore;
use fieldtasks::services::{SyncScheduler, TaskSyncService};

use common::{FixedClock, ListResponse, MockTaskSource, ids, setup_test_db, task, today};

#[tokio::test]
async fn test_scheduler_refreshes_periodically() {
    let store = TaskStore::new(setup_test_db().await);
    let remote = Arc::new(MockTaskSource::new(vec![task(1, 0, 9), task(2, 3, 9)]));
    let service = Arc::new(
        TaskSyncService::new(store.clone(), remote.clone(), Arc::new(ConnectivityFlag::new(true)))
            .with_clock(Arc::new(FixedClock(today()))),
    );

    let scheduler = SyncScheduler::new(service.clone(), Duration::from_millis(100));
    let scheduler_task = tokio::spawn(async move {
        scheduler.start().await;
    });

    tokio::time::sleep(Duration::from_millis(350)).await;
    scheduler_task.abort();

    assert!(remote.list_calls() >= 2, "expected repeated refreshes, got {}", remote.list_calls());
    assert_eq!(ids(&store.get_all().await.unwrap()), vec![1, 2]);
    assert_eq!(ids(&service.state().todays_tasks), vec![1]);
}

#[tokio::test]
async fn test_scheduler_keeps_running_after_failures() {
    let store = TaskStore::new(setup_test_db().await);
    let remote = Arc::new(MockTaskSource::new(vec![task(1, 0, 9)]));
    remote.respond_to_list(ListResponse::Reject(502));
    let service = Arc::new(
        TaskSyncService::new(store, remote.clone(), Arc::new(ConnectivityFlag::new(true)))
            .with_clock(Arc::new(FixedClock(today()))),
    );

    let scheduler = SyncScheduler::new(service.clone(), Duration::from_millis(50));
    let scheduler_task = tokio::spawn(scheduler.start());

    tokio::time::sleep(Duration::from_millis(180)).await;
    assert!(service.state().error.is_some());

    remote.respond_to_list(ListResponse::Tasks);
    tokio::time::sleep(Duration::from_millis(150)).await;
    scheduler_task.abort();

    assert!(remote.list_calls() >= 3);
    assert_eq!(service.state().error, None);
}
