use glade::{DecodeOptions, FsReader, SceneGraph, SectionKind};
use serde_json::json;
use std::path::PathBuf;

fn print_usage_and_exit() -> ! {
    eprintln!(
        "Usage:\n  scene_dump <model.(gltf|glb)> [options]\n\nOptions:\n  --resolve              compute global transforms before dumping\n  --no-matrix-accessors  reject MAT2/MAT3/MAT4 accessors\n  --max-tokens <n>       cap the JSON token count\n  --full                 include every entity, not just counts\n"
    );
    std::process::exit(2);
}

fn main() {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut positional = Vec::<String>::new();
    let mut options = DecodeOptions::default();
    let mut resolve = false;
    let mut full = false;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--resolve" => resolve = true,
            "--full" => full = true,
            "--no-matrix-accessors" => options.matrix_accessors = false,
            "--max-tokens" => {
                let Some(n) = args.get(i + 1).and_then(|s| s.parse().ok()) else {
                    print_usage_and_exit();
                };
                options.max_tokens = Some(n);
                i += 1;
            }
            "-h" | "--help" => print_usage_and_exit(),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let Some(path) = positional.first().map(PathBuf::from) else {
        print_usage_and_exit();
    };
    let bytes = std::fs::read(&path).expect("read model");
    let base = path.parent().map(PathBuf::from).unwrap_or_default();
    let mut io = FsReader::new(base);

    let mut scene =
        SceneGraph::from_slice_with_options(bytes, &mut io, &options).expect("decode model");
    if resolve {
        scene.resolve_global_transforms();
    }

    let sections: Vec<_> = scene
        .layout()
        .sections
        .iter()
        .filter(|s| s.count > 0)
        .map(|s| json!({ "kind": s.kind, "count": s.count, "offset": s.offset, "bytes": s.bytes }))
        .collect();

    let mut out = json!({
        "path": path.display().to_string(),
        "footprint": scene.footprint(),
        "sections": sections,
        "counts": {
            "accessors": scene.accessors().len(),
            "buffers": scene.buffers().len(),
            "bufferViews": scene.buffer_views().len(),
            "images": scene.images().len(),
            "samplers": scene.samplers().len(),
            "textures": scene.textures().len(),
            "materials": scene.materials().len(),
            "meshes": scene.meshes().len(),
            "primitives": scene.primitives().len(),
            "nodes": scene.nodes().len(),
            "skins": scene.skins().len(),
            "animations": scene.animations().len(),
        },
        "bounds": scene.bounds(),
    });

    if full {
        out["accessors"] = json!(scene.accessors());
        out["buffers"] = json!(scene.buffers());
        out["bufferViews"] = json!(scene.buffer_views());
        out["images"] = json!(scene.images());
        out["textures"] = json!(scene.textures());
        out["materials"] = json!(scene.materials());
        out["meshes"] = json!(scene.meshes());
        out["primitives"] = json!(scene.primitives());
        out["nodes"] = json!(scene.nodes());
        out["skins"] = json!(scene.skins());
        out["animations"] = json!(scene.animations());
        out["animationChannels"] = json!(scene.animation_channels());
        out["animationSamplers"] = json!(scene.animation_samplers());
    }

    let skinned = scene
        .layout()
        .section(SectionKind::Skins)
        .is_some_and(|s| s.count > 0);
    if skinned {
        let joints: Vec<_> = scene
            .skins()
            .iter()
            .map(|skin| {
                json!({
                    "joints": scene.skin_joints(skin),
                    "firstInverseBind": scene.inverse_bind_matrix(skin, 0),
                })
            })
            .collect();
        out["skinJoints"] = json!(joints);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&out).expect("serialize summary")
    );
}
