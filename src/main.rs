use shader_ngin::{Engine, ShaderScene, gpu::GlowGpu};

fn main() -> anyhow::Result<()> {
    let mut engine = Engine::new(1080, 720);
    let data_dir = engine.settings().data_dir.clone();
    engine.attach_scene(ShaderScene::<GlowGpu>::new(data_dir));
    engine.run()
}
