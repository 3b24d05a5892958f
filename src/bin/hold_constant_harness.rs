// hold_constant_harness.rs
// Runs an ideal-gas model through every Hold Constant mode and prints P, V, N, T
use gas_sim::init_config::InitConfig;
use gas_sim::simulation::{Fault, HoldConstant, IdealGasLawModel};
use gas_sim::species::Species;
use log::{LevelFilter, Log, Metadata, Record};
use std::sync::mpsc::{self, Receiver};

const STEPS_PER_PHASE: usize = 400;
const DT_PS: f64 = 0.1;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Info));

    println!("=== HOLD CONSTANT HARNESS ===");
    let init = match std::env::args().nth(1) {
        Some(path) => match InitConfig::load_from_file(&path) {
            Ok(init) => {
                println!("Loaded {path}");
                init
            }
            Err(e) => {
                println!("Failed to load {path}: {e}");
                return;
            }
        },
        None => InitConfig::default(),
    };

    let mut model = match init.build_model() {
        Ok(model) => model,
        Err(e) => {
            println!("Invalid configuration: {e}");
            return;
        }
    };
    if model.number_of_particles() == 0 {
        model.add_particles(Species::Heavy, 100);
        model.add_particles(Species::Light, 50);
    }
    let (tx, rx) = mpsc::channel();
    model.set_fault_sender(tx);

    println!("\n=== EQUILIBRATE ===");
    run_phase(&mut model, &rx, STEPS_PER_PHASE);

    let phases = [
        (HoldConstant::Volume, 0.5),
        (HoldConstant::Temperature, 0.0),
        (HoldConstant::PressureV, 0.3),
        (HoldConstant::PressureT, 0.0),
        (HoldConstant::Nothing, -0.5),
    ];
    for (mode, heat_cool) in phases {
        println!("\n=== HOLD {mode:?}, heat/cool {heat_cool:+.1} ===");
        model.set_hold_constant(mode);
        model.set_heat_cool_factor(heat_cool);
        if mode == HoldConstant::PressureT {
            model.request_container_resize(model.config.width_min);
        }
        run_phase(&mut model, &rx, STEPS_PER_PHASE);
        if model.hold_constant() != mode {
            println!("Mode fell back to {:?}", model.hold_constant());
        }
    }

    println!("\n=== FINAL ===");
    print_row(&model);
    #[cfg(feature = "profiling")]
    gas_sim::PROFILER.lock().log_and_clear();
}

fn run_phase(model: &mut IdealGasLawModel, rx: &Receiver<Fault>, steps: usize) {
    for step in 1..=steps {
        model.step_model_time(DT_PS);
        for fault in rx.try_iter() {
            println!("  fault at t = {:.1} ps: {fault}", model.time());
        }
        if step % (steps / 4).max(1) == 0 {
            print_row(model);
        }
    }
}

fn print_row(model: &IdealGasLawModel) {
    let fmt = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{v:.1}"));
    println!(
        "  t {:>7.1} ps | N {:>4} | T {:>8} K | P {:>8} kPa | gauge {:>8} kPa | W {:>7.0} pm",
        model.time(),
        model.number_of_particles(),
        fmt(model.temperature()),
        fmt(model.pressure()),
        fmt(model.pressure_model.gauge.reading()),
        model.container.width(),
    );
}
