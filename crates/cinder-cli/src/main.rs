use clap::{Parser, Subcommand, ValueEnum};
use cinder_cli::{network, report, vecadd};
use cinder_runtime::{
    enumerate_platforms, load_source, select_device, DeviceType, DeviceTypeFilter, Error,
    ExecutionContext,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceArg {
    Any,
    Cpu,
    Gpu,
    Accelerator,
}

impl From<DeviceArg> for DeviceTypeFilter {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Any => DeviceTypeFilter::Any,
            DeviceArg::Cpu => DeviceTypeFilter::Only(DeviceType::Cpu),
            DeviceArg::Gpu => DeviceTypeFilter::Only(DeviceType::Gpu),
            DeviceArg::Accelerator => DeviceTypeFilter::Only(DeviceType::Accelerator),
        }
    }
}

#[derive(Parser)]
#[command(name = "cinder", version, about = "Kernel-dispatch offload runtime demos")]
struct Cli {
    /// Device type to select
    #[arg(long, value_enum, default_value_t = DeviceArg::Any, global = true)]
    device: DeviceArg,

    /// Path to the kernel source file
    #[arg(long, default_value = "kernels/device.cl", global = true)]
    kernel: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available platforms and devices
    Info,
    /// Element-wise vector addition demo
    VecAdd {
        /// Number of elements
        #[arg(long, default_value_t = 1024)]
        elements: usize,
    },
    /// Fixed 3-layer feed-forward network demo
    Network {
        /// Scalar input to the network (defaults to pi/4)
        #[arg(long)]
        input: Option<f32>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn setup(cli: &Cli) -> cinder_runtime::Result<(ExecutionContext, String)> {
    let platforms = enumerate_platforms();
    report::print_platforms(&platforms);
    let device = select_device(cli.device.into())?;
    report::print_selected(&device);
    let ctx = ExecutionContext::new(&device)?;
    let source = load_source(&cli.kernel)?;
    Ok((ctx, source))
}

fn run(cli: Cli) -> cinder_runtime::Result<()> {
    match cli.command {
        Command::Info => {
            report::print_platforms(&enumerate_platforms());
            Ok(())
        }
        Command::VecAdd { elements } => {
            let (ctx, source) = setup(&cli)?;
            let run = vecadd::run(&ctx, &source, elements)?;
            report::print_profile(&run.report);
            if run.mismatches != 0 {
                return Err(Error::dispatch(format!(
                    "vector_add verification failed: {} of {} elements differ from {}",
                    run.mismatches, run.n, run.expected
                )));
            }
            println!(
                "vector_add: all {} elements equal {}",
                run.n, run.expected
            );
            Ok(())
        }
        Command::Network { input } => {
            let (ctx, source) = setup(&cli)?;
            let x = input.unwrap_or(network::DEFAULT_INPUT);
            let run = network::forward(&ctx, &source, x)?;
            let reference = network::host_forward(x);
            report::print_profile(&run.report);
            println!("input:          {x}");
            println!("output:         {}", run.output);
            println!("host reference: {reference}");
            Ok(())
        }
    }
}
