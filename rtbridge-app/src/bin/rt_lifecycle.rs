//! 以脚本的方式驱动一次完整的资源生命周期：
//! geometry -> BLAS -> TLAS -> update -> trace -> destroy -> cleanup

use std::path::PathBuf;

use clap::Parser;
use glam::Mat4;
use rtbridge_backend::RtBackendPreference;
use rtbridge_bindings::{RtBindings, RtConfig, global};
use rtbridge_script::{ScriptBuffer, ScriptObject, ScriptValue};

#[derive(Debug, clap::Parser)]
struct CommandLineArguments {
    #[arg(short, long, help = "TOML config file")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Backend preference: auto | none | dxr | vulkan | metal")]
    backend: Option<RtBackendPreference>,

    #[arg(long, default_value_t = 3, help = "Number of update + trace frames")]
    frames: u32,
}

/// 以脚本名调用全局实例，相当于 `rtBridge[name](...args)`
fn script_call(name: &str, args: &[ScriptValue]) -> ScriptValue {
    global::call(name, args).unwrap_or_default()
}

fn instance(blas: &ScriptValue, transform: Mat4, instance_id: u32) -> ScriptValue {
    ScriptObject::new()
        .with("blas", blas.clone())
        .with("transform", ScriptBuffer::from_f32(&transform.to_cols_array()))
        .with("instanceId", instance_id)
        .into()
}

fn run_scene(frames: u32) {
    log::info!(
        "{}.isSupported() = {}, getBackend() = {}",
        RtBindings::GLOBAL_NAME,
        script_call("isSupported", &[]),
        script_call("getBackend", &[])
    );

    let vertices = [-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0];
    let geometry = script_call(
        "createGeometry",
        &[ScriptObject::new()
            .with("vertices", ScriptBuffer::from_f32(&vertices))
            .with("indices", ScriptBuffer::from_u32(&[0, 1, 2, 0, 2, 3]))
            .into()],
    );
    let blas = script_call("createBLAS", &[ScriptValue::Array(vec![geometry.clone()])]);
    // BLAS 构建完成后 geometry 就不再需要了
    script_call("destroyGeometry", &[geometry]);

    let placements = [Mat4::IDENTITY, Mat4::from_translation(glam::vec3(3.0, 0.0, 0.0))];
    let instances = placements
        .iter()
        .enumerate()
        .map(|(i, transform)| instance(&blas, *transform, i as u32))
        .collect::<Vec<_>>();
    let tlas = script_call("createTLAS", &[ScriptValue::Array(instances)]);
    log::info!("geometry -> {blas} -> {tlas}");

    for frame in 0..frames {
        let angle = frame as f32 * 0.25;
        let instances = placements
            .iter()
            .enumerate()
            .map(|(i, transform)| instance(&blas, Mat4::from_rotation_y(angle) * *transform, i as u32))
            .collect::<Vec<_>>();
        script_call("updateTLAS", &[tlas.clone(), ScriptValue::Array(instances)]);
        script_call(
            "traceRays",
            &[ScriptObject::new()
                .with("tlas", tlas.clone())
                .with("width", 640u32)
                .with("height", 360u32)
                .with("outputTexture", ScriptValue::External(1))
                .into()],
        );
    }

    script_call("destroyTLAS", &[tlas]);
    script_call("destroyBLAS", &[blas]);
}

fn main() -> anyhow::Result<()> {
    let args = CommandLineArguments::parse();

    let mut config = RtConfig::load(args.config.as_deref())?;
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    rtbridge_crate_tools::init_log::init_log_with_level(config.log_level.to_level_filter());
    log::info!("config: backend = {}, log_level = {}", config.backend, config.log_level);

    global::initialize(&config);
    run_scene(args.frames);
    let leaked = global::cleanup();
    if leaked.total() > 0 {
        log::warn!("{} resources were still alive at cleanup", leaked.total());
    }
    Ok(())
}
