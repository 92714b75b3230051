//! Headless seam selection on a procedural tube.
//!
//! Drives a [`SeamSession`] with synthetic pointer input against the software
//! rasterizer and prints the status line after each frame.
//!
//! Usage:
//! ```text
//! cargo run --example headless
//! RUST_LOG=seamcut=debug cargo run --example headless
//! ```

use seamcut::creation::MakeTube;
use seamcut::math::Matrix4f;
use seamcut::picking::PickerConfig;
use seamcut::render::{to_gpu_point, CameraMatrices, RenderBackend, SoftwareBackend};
use seamcut::session::{FrameInput, InteractionMode, SeamSession, SessionSettings, StatusBar};
use seamcut::topology::VertexId;
use seamcut::Result;
use tracing::{info, warn};

const SEGMENTS: u32 = 16;
const RINGS: u32 = 6;

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for this demo and seamcut.
    // Override with RUST_LOG env var (e.g. RUST_LOG=seamcut=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("headless=info".parse().unwrap_or_default())
        .add_directive("seamcut=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mesh = MakeTube::new(1.0, 3.0, SEGMENTS, RINGS).execute()?;
    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        boundary = mesh.boundary_vertices().count(),
        "built tube"
    );

    // Fit the tube into [-1, 1]^3 and turn its axis upright, facing +y.
    let model = mesh.normalizing_transform();
    let view = Matrix4f::from_euler_angles(-std::f32::consts::FRAC_PI_2, 0.0, 0.0);
    let camera = CameraMatrices::new(model, view, Matrix4f::new_scaling(0.8));

    let mut backend = SoftwareBackend::new(320, 320)?;
    let mut session = SeamSession::new(
        &mut backend,
        &mesh,
        SessionSettings::default(),
        PickerConfig::default(),
    )?;
    let mut status = StatusBar::default();

    // Front column of the tube: bottom rim, middle, top rim.
    let front = SEGMENTS / 4;
    let clicks = [
        (InteractionMode::SelectSeam, RINGS / 2 * SEGMENTS + front),
        (InteractionMode::SelectSeam, front),
        (InteractionMode::Inspect, RINGS / 2 * SEGMENTS + front),
        (InteractionMode::SelectSeam, RINGS / 2 * SEGMENTS + front),
        (InteractionMode::SelectSeam, RINGS / 2 * SEGMENTS + front),
        (InteractionMode::SelectSeam, RINGS * SEGMENTS + front),
        (InteractionMode::SelectSeam, front + 1),
    ];

    for (mode, target) in clicks {
        let vertex = VertexId(target);
        let point = to_gpu_point(&mesh.point(vertex)?);
        let Some(pointer) = camera.project_to_window(backend.viewport(), &point) else {
            warn!(%vertex, "vertex is not visible");
            continue;
        };

        session.settings_mut().mode = mode;
        session.frame(&mut backend, &FrameInput::hover(pointer), &camera, &mut status)?;
        let report = session.frame(&mut backend, &FrameInput::click(pointer), &camera, &mut status)?;
        session.render(&mut backend, &camera)?;

        println!("[{mode:?}] click {vertex}: {}", status.text());
        if report.hovered != Some(vertex) {
            warn!(%vertex, hovered = ?report.hovered, "pick missed the target");
        }
    }

    let seam = session.seam();
    info!(
        state = ?seam.state(),
        vertices = seam.vertices().len(),
        length = seam.length()?,
        "final seam"
    );
    Ok(())
}
