// main.rs - Desktop viewer for the Conway engine
// Renders one committed snapshot per generation; all updates go through `conway::Life`.

use eframe::egui;
use egui::Color32;
use std::time::{Duration, Instant};

use conway::{Life, LifeConfig, LifeError, Snapshot, Strategy};

mod ui;

pub const GRID_SIZE: usize = 100;                     // Interior shown on screen (100x100)
pub const TOTAL_SIZE: usize = GRID_SIZE + 2;          // Grid size including the dead border
pub const POOL_SIZE: usize = 8;                       // Workers for the pool strategy

pub const STRATEGIES: [Strategy; 3] = [
    Strategy::Sequential,
    Strategy::ParallelPerCell,
    Strategy::WorkerPool(POOL_SIZE),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let app = GameOfLife::new(default_config())?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 950.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Grid the window opens with: `GRID_SIZE` interior cells a side plus the border.
fn default_config() -> LifeConfig {
    LifeConfig::new(TOTAL_SIZE, TOTAL_SIZE)
        .with_seed_probability(0.3)
        .with_strategy(STRATEGIES[2])
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Viewer state around the engine. `snapshot` is refreshed after every
/// committed generation or edit and is the only thing drawn.
pub struct GameOfLife {
    life: Life,
    pub snapshot: Snapshot,
    pub is_running: bool,
    pub last_update: Instant,
    pub update_interval: Duration,
    pub live_color: Color32,
    pub dead_color: Color32,
    pub selected_pattern: usize,
    pub selected_strategy: usize,
    pub last_step: Duration,
    pub status: Option<String>,
}

impl GameOfLife {
    pub fn new(config: LifeConfig) -> Result<Self, LifeError> {
        let selected_strategy = STRATEGIES
            .iter()
            .position(|s| *s == config.strategy)
            .unwrap_or(0);
        let life = Life::initialize(config)?;
        let snapshot = life.snapshot();

        Ok(Self {
            life,
            snapshot,
            is_running: false,
            last_update: Instant::now(),
            update_interval: Duration::from_millis(100),
            live_color: Color32::from_rgb(0, 200, 0),
            dead_color: Color32::from_rgb(40, 40, 40),
            selected_pattern: 0,
            selected_strategy,
            last_step: Duration::ZERO,
            status: None,
        })
    }

    pub fn strategy(&self) -> Strategy {
        STRATEGIES[self.selected_strategy]
    }

    pub fn update_generation(&mut self) {
        match self.life.advance_generation(self.strategy()) {
            Ok(report) => {
                self.last_step = report.elapsed;
                self.refresh();
                if self.life.check_for_cycle() {
                    self.is_running = false;
                    self.status = Some(format!("Cycle detected at generation {}", report.generation));
                }
            }
            Err(err) => {
                self.is_running = false;
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn clear_grid(&mut self) {
        self.life.clear();
        self.refresh();
    }

    pub fn random_grid(&mut self) {
        let probability = self.life.config().seed_probability;
        let reseeded = self.life.reseed(probability);
        self.refresh();
        if let Err(err) = reseeded {
            self.status = Some(err.to_string());
        }
    }

    pub fn apply_selected_pattern(&mut self) {
        if let Some(pattern) = conway::PATTERNS.get(self.selected_pattern) {
            let origin = pattern.centered_origin(TOTAL_SIZE, TOTAL_SIZE);
            let applied = self.life.apply_pattern(pattern, origin);
            self.refresh();
            if let Err(err) = applied {
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn toggle_cell(&mut self, x: usize, y: usize) {
        if self.life.toggle_cell(x, y).is_ok() {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.snapshot = self.life.snapshot();
        self.status = None;
    }
}
