use std::collections::VecDeque;
use std::io::{self, Cursor};

use actix_web::{web, HttpResponse, Result};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use log::info;
use plotters::prelude::*;
use plotters::style::Palette99;
use serde::{Deserialize, Serialize};

use crate::controller::SimulationController;
use crate::dynamics;
use crate::model::{bob_positions, PendulumParameters, PendulumState, PendulumSystem};
use crate::solver::SingularPolicy;

/// Upper bound on the tick count of a single simulate call.
const MAX_STEPS: usize = 100_000;

/// How many of the final bob's positions the trace keeps.
pub const TRACE_CAPACITY: usize = 1500;

const IMAGE_WIDTH: u32 = 500;
const IMAGE_HEIGHT: u32 = 500;

/// Bounded FIFO of the final bob's Cartesian positions. Once full, the
/// oldest point is evicted for each new one.
#[derive(Debug, Default)]
pub struct TraceBuffer {
    points: VecDeque<(f64, f64)>,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRACE_CAPACITY),
        }
    }

    pub fn push(&mut self, point: (f64, f64)) {
        if self.points.len() == TRACE_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.points.iter()
    }
}

#[derive(Debug, Deserialize)]
pub struct SimRequest {
    /// Bob masses in kg.
    pub masses: Vec<f64>,
    /// Rod lengths in m.
    pub lengths: Vec<f64>,
    /// Gravitational acceleration in m/s².
    pub g: f64,
    /// Initial angles in radians from the downward vertical.
    pub initial_thetas: Vec<f64>,
    /// Initial angular velocities in rad/s; zeros when omitted.
    #[serde(default)]
    pub initial_omegas: Option<Vec<f64>>,
    /// Number of ticks to simulate.
    pub steps: usize,
}

#[derive(Debug, Serialize)]
pub struct SimResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Base64 PNG data URL of the final bob's trace.
    pub trajectory_image: String,
    pub animation_data: AnimationData,
    /// Relative drift of the total mechanical energy over the run.
    pub energy_drift: f64,
}

#[derive(Debug, Serialize)]
pub struct AnimationData {
    /// Per frame: `[x1, y1, x2, y2, ...]` in meters, y growing downward.
    pub positions: Vec<Vec<f64>>,
    pub n: usize,
    /// Half-extent for consistent scaling: total chain length plus padding.
    pub limit: f64,
}

fn failure(message: String) -> SimResponse {
    SimResponse {
        success: false,
        error: Some(message),
        trajectory_image: String::new(),
        animation_data: AnimationData {
            positions: Vec::new(),
            n: 0,
            limit: 0.0,
        },
        energy_drift: 0.0,
    }
}

fn frame_of(controller: &SimulationController) -> Vec<f64> {
    let mut frame = Vec::with_capacity(2 * controller.params().link_count());
    for (x, y) in bob_positions(controller.state(), controller.params()) {
        frame.push(x);
        frame.push(y);
    }
    frame
}

/// Runs the requested number of ticks and returns the per-frame positions,
/// the rendered trace image, and the energy drift of the run.
pub async fn simulate_handler(request: web::Json<SimRequest>) -> Result<HttpResponse> {
    let request = request.into_inner();
    let steps = request.steps.min(MAX_STEPS);

    let params = PendulumParameters {
        masses: request.masses,
        lengths: request.lengths,
        g: request.g,
    };
    let omegas = request
        .initial_omegas
        .unwrap_or_else(|| vec![0.0; request.initial_thetas.len()]);
    let state = PendulumState {
        thetas: request.initial_thetas,
        omegas,
    };

    let mut controller = match SimulationController::new(params, state, SingularPolicy::default()) {
        Ok(controller) => controller,
        Err(err) => return Ok(HttpResponse::Ok().json(failure(err.to_string()))),
    };

    let n = controller.params().link_count();
    let limit = controller.params().total_length() + 0.5;
    let initial_energy = dynamics::mechanical_energy(controller.state(), controller.params());

    let mut frames = Vec::with_capacity(steps + 1);
    let mut trace = TraceBuffer::new();

    let first = frame_of(&controller);
    if let [.., x, y] = first[..] {
        trace.push((x, y));
    }
    frames.push(first);

    for _ in 0..steps {
        if let Err(err) = controller.step() {
            return Ok(HttpResponse::Ok().json(failure(err.to_string())));
        }
        let frame = frame_of(&controller);
        if let [.., x, y] = frame[..] {
            trace.push((x, y));
        }
        frames.push(frame);
    }

    let final_energy = dynamics::mechanical_energy(controller.state(), controller.params());
    let energy_drift = if initial_energy != 0.0 {
        ((final_energy - initial_energy) / initial_energy).abs()
    } else {
        (final_energy - initial_energy).abs()
    };

    let trajectory_image = render_trace(&frames, &trace, n, limit)?;
    info!("simulated {n}-link chain for {steps} ticks (energy drift {energy_drift:.3e})");

    Ok(HttpResponse::Ok().json(SimResponse {
        success: true,
        error: None,
        trajectory_image,
        animation_data: AnimationData {
            positions: frames,
            n,
            limit,
        },
        energy_drift,
    }))
}

/// Draws every bob's path and the bounded trace of the final bob, then
/// encodes the chart as a base64 PNG data URL.
fn render_trace(
    frames: &[Vec<f64>],
    trace: &TraceBuffer,
    n: usize,
    limit: f64,
) -> io::Result<String> {
    let mut pixel_buffer = vec![0u8; (IMAGE_WIDTH * IMAGE_HEIGHT * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixel_buffer, (IMAGE_WIDTH, IMAGE_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(io::Error::other)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Trace (n={n})"), ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(30)
            .build_cartesian_2d(-limit..limit, -limit..limit)
            .map_err(io::Error::other)?;
        chart.configure_mesh().draw().map_err(io::Error::other)?;

        let mut colors: Vec<ShapeStyle> = vec![
            BLUE.mix(0.75).stroke_width(1),
            RED.mix(0.75).stroke_width(1),
            GREEN.mix(0.75).stroke_width(1),
            CYAN.mix(0.75).stroke_width(1),
            MAGENTA.mix(0.75).stroke_width(1),
            YELLOW.mix(0.75).stroke_width(1),
        ];
        for i in colors.len()..n {
            colors.push(Palette99::pick(i).stroke_width(2));
        }

        // Inner bobs: full path. Chart coordinates put y up, the model puts
        // y down, hence the sign flip.
        for k in 0..n.saturating_sub(1) {
            chart
                .draw_series(LineSeries::new(
                    frames.iter().map(|frame| (frame[2 * k], -frame[2 * k + 1])),
                    colors[k % colors.len()],
                ))
                .map_err(io::Error::other)?;
        }

        // Final bob: the bounded trace, drawn heavier.
        if n > 0 {
            chart
                .draw_series(LineSeries::new(
                    trace.iter().map(|&(x, y)| (x, -y)),
                    colors[(n - 1) % colors.len()].stroke_width(2),
                ))
                .map_err(io::Error::other)?;
        }

        root.present().map_err(io::Error::other)?;
    }

    let img_buffer = image::ImageBuffer::from_raw(IMAGE_WIDTH, IMAGE_HEIGHT, pixel_buffer)
        .ok_or_else(|| io::Error::other("failed to create image buffer"))?;
    let dynamic_image = image::DynamicImage::ImageRgb8(img_buffer);

    let mut png_buffer = Cursor::new(Vec::new());
    dynamic_image
        .write_to(&mut png_buffer, ImageFormat::Png)
        .map_err(|e| io::Error::other(e.to_string()))?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_buffer.into_inner())
    ))
}

/// Hands the frontend a freshly randomized chain to load into its controls.
pub async fn randomize_handler() -> Result<HttpResponse> {
    let system = PendulumSystem::randomize(&mut rand::thread_rng());
    info!("randomized a {}-link chain", system.params.link_count());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "masses": system.params.masses,
        "lengths": system.params.lengths,
        "g": system.params.g,
        "thetas": system.state.thetas,
        "omegas": system.state.omegas,
    })))
}
