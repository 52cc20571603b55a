use lumen_engine::device::{IndexType, Topology};
use lumen_engine::headless::{DeviceCall, HeadlessPlatform};
use lumen_engine::input::{Key, KeyEvent};
use lumen_engine::window::PlatformEvent;
use lumen_engine::{LifecycleState, Runtime};
use lumen_lessons::{BasicWindowApplication, HelloTriangleApplication};

#[test]
fn one_frame_issues_one_clear_and_one_indexed_draw() {
    let platform = HeadlessPlatform::new().with_frame_limit(1);
    let probe = platform.probe();
    let mut app = HelloTriangleApplication::new();

    let summary = Runtime::run(&mut app, platform).unwrap();
    assert_eq!(summary.frames, 1);

    let calls = probe.device().calls();

    let pipeline = calls
        .iter()
        .find_map(|c| match c {
            DeviceCall::CreatePipeline { id, label } if label == "Simple" => Some(*id),
            _ => None,
        })
        .expect("pipeline Simple created");
    let layout = calls
        .iter()
        .find_map(|c| match c {
            DeviceCall::CreateVertexLayout { id, label } if label == "PositionUv" => Some(*id),
            _ => None,
        })
        .expect("layout PositionUv created");

    assert_eq!(calls.iter().filter(|c| c.is_clear()).count(), 1);

    let draws: Vec<_> = calls.iter().filter(|c| c.is_draw()).collect();
    assert_eq!(
        draws,
        vec![&DeviceCall::DrawIndexed {
            pipeline: Some(pipeline),
            layout: Some(layout),
            topology: Topology::TriangleList,
            index_count: 3,
            index_type: IndexType::U32,
        }]
    );
}

#[test]
fn stages_are_labelled_from_the_program_name() {
    let platform = HeadlessPlatform::new().with_frame_limit(1);
    let probe = platform.probe();

    Runtime::run(&mut HelloTriangleApplication::new(), platform).unwrap();

    let labels: Vec<_> = probe
        .device()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            DeviceCall::CreateStageProgram { label, .. } => Some(label),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["VS_Simple".to_string(), "FS_Simple".to_string()]);
}

#[test]
fn unload_releases_every_object() {
    let platform = HeadlessPlatform::new().with_frame_limit(3);
    let probe = platform.probe();
    let mut app = HelloTriangleApplication::new();

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.final_state, LifecycleState::Unloaded);
    assert_eq!(probe.device().live_object_count(), 0);
    assert!(probe.is_terminated());
}

#[test]
fn basic_window_closes_on_escape() {
    let platform = HeadlessPlatform::new()
        .with_poll([])
        .with_poll([PlatformEvent::Key(KeyEvent::pressed(Key::Escape))])
        .with_frame_limit(100);
    let mut app = BasicWindowApplication::new();

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.frames, 2);
    assert_eq!(app.frames(), 2);
}
