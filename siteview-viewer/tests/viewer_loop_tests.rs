//! Render loop, resize handling and disposal
use siteview_viewer::{ViewerError, ViewerStatus, Viewport};
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::LocalSet;

mod test_helpers;
use test_helpers::*;

#[tokio::test]
async fn test_loop_draws_only_when_dirty() {
    LocalSet::new()
        .run_until(async {
            let (viewer, log) = headless_viewer(enveloped_document());
            let (clock, ticks) = ManualClock::new();
            let (_resize, events) = unbounded_channel();
            viewer.mount(clock, events).unwrap();

            ticks.send(()).unwrap();
            settle().await;
            assert_eq!(log.borrow().frames, 1);

            for _ in 0..3 {
                ticks.send(()).unwrap();
            }
            settle().await;
            assert_eq!(log.borrow().frames, 1);

            viewer.request_redraw();
            ticks.send(()).unwrap();
            settle().await;
            assert_eq!(log.borrow().frames, 2);
        })
        .await;
}

#[tokio::test]
async fn test_loop_keeps_running_while_loading() {
    LocalSet::new()
        .run_until(async {
            let (source, release) = GatedSource::new();
            let (viewer, log) = viewer_with_source(Box::new(source));
            let (clock, ticks) = ManualClock::new();
            let (_resize, events) = unbounded_channel();
            viewer.mount(clock, events).unwrap();

            let loading = viewer.clone();
            let load = tokio::task::spawn_local(async move { loading.load().await });

            for _ in 0..3 {
                viewer.request_redraw();
                ticks.send(()).unwrap();
                settle().await;
            }
            assert_eq!(viewer.status(), ViewerStatus::Loading);
            assert_eq!(log.borrow().frames, 3);
            assert_eq!(log.borrow().meshes, 0);

            release.send(enveloped_document()).unwrap();
            assert_eq!(load.await.unwrap().unwrap(), ViewerStatus::Idle);

            ticks.send(()).unwrap();
            settle().await;
            assert_eq!(log.borrow().frames, 4);
            assert_eq!(log.borrow().meshes, 4);
        })
        .await;
}

#[tokio::test]
async fn test_each_resize_event_draws_once() {
    LocalSet::new()
        .run_until(async {
            let (viewer, log) = headless_viewer(enveloped_document());
            let (clock, ticks) = ManualClock::new();
            let (resize, events) = unbounded_channel();
            viewer.mount(clock, events).unwrap();

            ticks.send(()).unwrap();
            settle().await;
            let baseline = log.borrow().frames;

            for (width, height) in [(1024, 512), (300, 600)] {
                resize.send(Viewport::new(width, height)).unwrap();
                settle().await;
                assert!((viewer.camera().aspect_ratio - width as f32 / height as f32).abs() < 1e-6);

                ticks.send(()).unwrap();
                ticks.send(()).unwrap();
                settle().await;
            }

            assert_eq!(log.borrow().frames, baseline + 2);
            assert_eq!(log.borrow().size, (300, 600));
            assert_eq!(viewer.viewport(), Viewport::new(300, 600));
        })
        .await;
}

#[tokio::test]
async fn test_dispose_stops_loop_and_resize() {
    LocalSet::new()
        .run_until(async {
            let (viewer, log) = headless_viewer(enveloped_document());
            let (clock, ticks) = ManualClock::new();
            let (resize, events) = unbounded_channel();
            viewer.mount(clock, events).unwrap();
            viewer.load().await.unwrap();

            ticks.send(()).unwrap();
            settle().await;
            let frames = log.borrow().frames;

            viewer.dispose();
            viewer.dispose();
            assert!(log.borrow().disposed);
            assert!(viewer.model().is_none());

            viewer.request_redraw();
            let _ = resize.send(Viewport::new(10, 10));
            let _ = ticks.send(());
            settle().await;

            assert_eq!(log.borrow().frames, frames);
            assert_eq!(viewer.viewport(), Viewport::new(800, 600));
            assert!(matches!(viewer.highlight_objects(&[]), Err(ViewerError::Disposed)));
            assert!(matches!(viewer.load().await, Err(ViewerError::Disposed)));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_interval_clock_drives_loop() {
    LocalSet::new()
        .run_until(async {
            let (viewer, log) = headless_viewer(enveloped_document());
            let (_resize, events) = unbounded_channel();
            viewer
                .mount(siteview_viewer::IntervalClock::new(60), events)
                .unwrap();
            viewer.load().await.unwrap();

            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            // Initial frame plus the model attach, then nothing moves
            assert!(log.borrow().frames >= 1);
            let settled = log.borrow().frames;

            viewer.request_redraw();
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            assert_eq!(log.borrow().frames, settled + 1);
            viewer.dispose();
        })
        .await;
}
