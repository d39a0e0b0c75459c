use crate::test_support::{MemoryReader, assert_approx, decode_json, glb, push_chunk};
use crate::{
    AccessorShape, Attribute, BufferSource, ComponentType, DecodeOptions, DrawMode, Error,
    ImageSource, JsonTokenizer, NoExternalFiles, SceneGraph, SectionKind, Span, Token, TokenKind,
    Tokenize, decode_with, frame,
};
use serde_json::json;
use std::cell::Cell;
use std::sync::Arc;

#[test]
fn minimal_node_with_translation() {
    let scene = decode_json(json!({
        "asset": { "version": "2.0" },
        "nodes": [ { "translation": [1, 2, 3] } ]
    }))
    .expect("decode");

    assert_eq!(scene.nodes().len(), 1);
    assert_eq!(scene.meshes().len(), 0);
    assert_eq!(scene.primitives().len(), 0);
    assert_eq!(scene.buffers().len(), 0);

    let node = &scene.nodes()[0];
    assert_approx(node.transform[12], 1.0);
    assert_approx(node.transform[13], 2.0);
    assert_approx(node.transform[14], 3.0);
    assert_eq!(node.mesh, None);
    assert_eq!(node.skin, None);
    assert!(node.children.is_empty());
    assert_eq!(node.global_transform, node.transform);
}

#[test]
fn empty_document_decodes_to_empty_graph() {
    let scene = decode_json(json!({})).expect("decode");
    assert_eq!(scene.nodes().len(), 0);
    assert_eq!(scene.accessors().len(), 0);
    assert_eq!(scene.footprint(), 0);
    assert_eq!(scene.bounds(), None);
}

#[test]
fn glb_chunk_buffer_aliases_bin_payload() {
    let bin: Vec<u8> = (0u8..12).collect();
    let document = json!({
        "asset": { "version": "2.0" },
        "buffers": [ { "byteLength": 12 } ],
        "bufferViews": [ { "buffer": 0, "byteOffset": 0, "byteLength": 12 } ]
    });
    let bytes = glb(&document.to_string(), &bin);
    let chunk = frame(&bytes).expect("frame").bin.expect("bin chunk");

    let scene = SceneGraph::from_slice(bytes, &mut NoExternalFiles).expect("decode");
    let buffer = &scene.buffers()[0];
    assert_eq!(buffer.size, 12);
    assert_eq!(buffer.source, BufferSource::BinaryChunk);
    assert_eq!(scene.buffer_bytes(0), Some(bin.as_slice()));

    let view = &scene.buffer_views()[0];
    assert_eq!(view.offset, chunk.start);
    assert_eq!(view.length, 12);
    assert_eq!(scene.view_bytes(0), Some(bin.as_slice()));
}

#[test]
fn glb_view_offsets_shift_by_chunk_start() {
    let bin: Vec<u8> = (0u8..16).collect();
    let document = json!({
        "buffers": [ { "byteLength": 16 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 4, "byteLength": 8, "byteStride": 4 }
        ]
    });
    let bytes = glb(&document.to_string(), &bin);
    let chunk = frame(&bytes).expect("frame").bin.expect("bin chunk");

    let scene = SceneGraph::from_slice(bytes, &mut NoExternalFiles).expect("decode");
    let view = &scene.buffer_views()[0];
    assert_eq!(view.offset, chunk.start + 4);
    assert_eq!(view.stride, Some(4));
    assert_eq!(scene.view_bytes(0), Some(&bin[4..12]));
}

#[test]
fn glb_views_stay_inside_the_bin_chunk() {
    let document = json!({
        "buffers": [ { "byteLength": 4 } ],
        "bufferViews": [ { "buffer": 0, "byteLength": 16 } ]
    });
    let mut bytes = glb(&document.to_string(), &[1, 2, 3, 4]);
    push_chunk(&mut bytes, 0x1234, &[9; 4]);
    assert!(matches!(
        SceneGraph::from_slice(bytes, &mut NoExternalFiles),
        Err(Error::BufferViewOutOfBounds {
            view: 0,
            buffer: 0,
            end: 16,
            size: 4
        })
    ));

    let document = json!({
        "buffers": [ { "byteLength": 4 } ],
        "bufferViews": [ { "buffer": 0, "byteOffset": 1, "byteLength": 3 } ]
    });
    let mut bytes = glb(&document.to_string(), &[1, 2, 3, 4]);
    push_chunk(&mut bytes, 0x1234, &[9; 4]);
    let scene = SceneGraph::from_slice(bytes, &mut NoExternalFiles).expect("decode");
    assert_eq!(scene.view_bytes(0), Some(&[2u8, 3, 4][..]));
    assert_eq!(scene.buffer_bytes(0), Some(&[1u8, 2, 3, 4][..]));
}

#[test]
fn external_views_stay_inside_their_buffer() {
    let mut io = MemoryReader::default().with("mesh.bin", vec![0u8; 4]);
    let document = json!({
        "buffers": [ { "uri": "mesh.bin", "byteLength": 4 } ],
        "bufferViews": [
            { "buffer": 0, "byteLength": 4 },
            { "buffer": 0, "byteOffset": 2, "byteLength": 100 }
        ]
    });
    let result = SceneGraph::from_slice(document.to_string().into_bytes(), &mut io);
    assert!(matches!(
        result,
        Err(Error::BufferViewOutOfBounds {
            view: 1,
            buffer: 0,
            end: 102,
            size: 4
        })
    ));
}

#[test]
fn escaped_uris_reach_the_reader_resolved() {
    let mut io = MemoryReader::default()
        .with("data/mesh.bin", vec![0u8; 4])
        .with("caf\u{e9}.png", vec![1u8]);
    let document = br#"{
        "buffers": [ { "uri": "data\/mesh.bin", "byteLength": 4 } ],
        "images": [ { "uri": "caf\u00e9.png", "mimeType": "image\/png" } ]
    }"#;
    let scene = SceneGraph::from_slice(document.to_vec(), &mut io).expect("decode");
    assert_eq!(io.requested, ["data/mesh.bin", "caf\u{e9}.png"]);
    assert_eq!(
        scene.buffers()[0].source,
        BufferSource::Uri("data/mesh.bin".to_string())
    );
    match &scene.images()[0].source {
        ImageSource::Uri { uri, bytes } => {
            assert_eq!(uri, "caf\u{e9}.png");
            assert_eq!(bytes, &[1u8]);
        }
        other => panic!("expected a uri image, got {other:?}"),
    }
}

#[test]
fn glb_chunk_padding_is_tolerated() {
    let document = json!({ "buffers": [ { "byteLength": 10 } ] });
    let bytes = glb(&document.to_string(), &[7u8; 12]);
    let scene = SceneGraph::from_slice(bytes, &mut NoExternalFiles).expect("decode");
    assert_eq!(scene.buffers()[0].size, 12);

    let document = json!({ "buffers": [ { "byteLength": 16 } ] });
    let bytes = glb(&document.to_string(), &[7u8; 12]);
    assert!(matches!(
        SceneGraph::from_slice(bytes, &mut NoExternalFiles),
        Err(Error::BufferSizeMismatch {
            buffer: 0,
            expected: 16,
            actual: 12
        })
    ));
}

#[test]
fn float_vec3_accessor() {
    let scene = decode_json(json!({
        "accessors": [ { "componentType": 5126, "type": "VEC3", "count": 10 } ]
    }))
    .expect("decode");

    let accessor = &scene.accessors()[0];
    assert_eq!(accessor.component_type, ComponentType::F32);
    assert_eq!(accessor.shape, AccessorShape::Vec3);
    assert_eq!(accessor.components(), 3);
    assert_eq!(accessor.element_size(), 12);
    assert_eq!(accessor.count, 10);
    assert_eq!(accessor.view, None);
    assert_eq!(accessor.offset, 0);
    assert!(!accessor.normalized);
    assert_eq!(accessor.min, None);
}

#[test]
fn accessor_component_codes_map_in_order() {
    let codes = [5120, 5121, 5122, 5123, 5125, 5126];
    let accessors: Vec<_> = codes
        .iter()
        .map(|code| json!({ "componentType": code, "type": "SCALAR", "count": 1 }))
        .collect();
    let scene = decode_json(json!({ "accessors": accessors })).expect("decode");

    let types: Vec<_> = scene.accessors().iter().map(|a| a.component_type).collect();
    assert_eq!(
        types,
        vec![
            ComponentType::I8,
            ComponentType::U8,
            ComponentType::I16,
            ComponentType::U16,
            ComponentType::U32,
            ComponentType::F32,
        ]
    );
    assert!(scene.accessors().iter().all(|a| a.components() == 1));
}

#[test]
fn unknown_component_type_fails() {
    for code in [0i64, 5124, 5127, 5130] {
        let result = decode_json(json!({
            "accessors": [
                { "componentType": 5126, "type": "SCALAR", "count": 1 },
                { "componentType": code, "type": "SCALAR", "count": 1 }
            ]
        }));
        match result {
            Err(Error::UnknownComponentType { accessor, value }) => {
                assert_eq!(accessor, 1);
                assert_eq!(value, code);
            }
            other => panic!("expected UnknownComponentType for {code}, got {other:?}"),
        }
    }
}

#[test]
fn matrix_accessors_follow_options() {
    let document = json!({
        "accessors": [ { "componentType": 5126, "type": "MAT4", "count": 2 } ]
    });
    let scene = decode_json(document.clone()).expect("decode");
    assert_eq!(scene.accessors()[0].shape, AccessorShape::Mat4);
    assert_eq!(scene.accessors()[0].components(), 16);

    let options = DecodeOptions {
        matrix_accessors: false,
        ..DecodeOptions::default()
    };
    let result = SceneGraph::from_slice_with_options(
        document.to_string().into_bytes(),
        &mut NoExternalFiles,
        &options,
    );
    assert!(matches!(
        result,
        Err(Error::UnsupportedAccessorShape { accessor: 0, ref value }) if value == "MAT4"
    ));
}

#[test]
fn unknown_accessor_shape_fails() {
    for name in ["VEC5", "VEC", "scalar", "MAT44"] {
        let result = decode_json(json!({
            "accessors": [ { "componentType": 5126, "type": name, "count": 1 } ]
        }));
        assert!(
            matches!(result, Err(Error::UnsupportedAccessorShape { .. })),
            "{name}: {result:?}"
        );
    }
}

#[test]
fn accessor_bounds_are_kept_inline() {
    let scene = decode_json(json!({
        "accessors": [ {
            "componentType": 5126, "type": "VEC3", "count": 3,
            "min": [-1, -2, -3], "max": [1, 2, 3], "normalized": true, "byteOffset": 8
        } ]
    }))
    .expect("decode");
    let accessor = &scene.accessors()[0];
    assert_eq!(accessor.min.expect("min").as_slice(), &[-1.0, -2.0, -3.0]);
    assert_eq!(accessor.max.expect("max").as_slice(), &[1.0, 2.0, 3.0]);
    assert!(accessor.normalized);
    assert_eq!(accessor.offset, 8);
}

#[test]
fn missing_required_members_are_reported() {
    let result = decode_json(json!({
        "accessors": [ { "componentType": 5126, "type": "VEC3" } ]
    }));
    assert!(matches!(
        result,
        Err(Error::MissingField {
            entity: "accessor",
            index: 0,
            field: "count"
        })
    ));

    let bytes = glb(&json!({ "buffers": [ {} ] }).to_string(), &[0; 4]);
    assert!(matches!(
        SceneGraph::from_slice(bytes, &mut NoExternalFiles),
        Err(Error::MissingField {
            entity: "buffer",
            field: "byteLength",
            ..
        })
    ));

    let bytes = glb(
        &json!({
            "buffers": [ { "byteLength": 4 } ],
            "bufferViews": [ { "buffer": 0 } ]
        })
        .to_string(),
        &[0; 4],
    );
    assert!(matches!(
        SceneGraph::from_slice(bytes, &mut NoExternalFiles),
        Err(Error::MissingField {
            entity: "bufferView",
            index: 0,
            field: "byteLength"
        })
    ));
}

#[test]
fn external_buffers_are_read_through_the_reader() {
    let mut io = MemoryReader::default().with("data/mesh.bin", vec![1u8, 2, 3, 4, 5, 6]);
    let document = json!({
        "buffers": [ { "uri": "data/mesh.bin", "byteLength": 6 } ],
        "bufferViews": [ { "buffer": 0, "byteOffset": 2, "byteLength": 3 } ]
    });
    let scene = SceneGraph::from_slice(document.to_string().into_bytes(), &mut io)
        .expect("decode");

    assert_eq!(io.requested, vec!["data/mesh.bin".to_string()]);
    let buffer = &scene.buffers()[0];
    assert_eq!(buffer.size, 6);
    assert_eq!(buffer.source, BufferSource::Uri("data/mesh.bin".to_string()));
    assert_eq!(scene.buffer_bytes(0), Some(&[1u8, 2, 3, 4, 5, 6][..]));
    // External buffers are not shifted.
    assert_eq!(scene.buffer_views()[0].offset, 2);
    assert_eq!(scene.view_bytes(0), Some(&[3u8, 4, 5][..]));
}

#[test]
fn external_buffer_size_must_match() {
    let mut io = MemoryReader::default().with("short.bin", vec![0u8; 3]);
    let document = json!({ "buffers": [ { "uri": "short.bin", "byteLength": 4 } ] });
    let result = SceneGraph::from_slice(document.to_string().into_bytes(), &mut io);
    assert!(matches!(
        result,
        Err(Error::BufferSizeMismatch {
            buffer: 0,
            expected: 4,
            actual: 3
        })
    ));
}

#[test]
fn external_read_failures_abort_decode() {
    let mut io = MemoryReader::default();
    let document = json!({ "buffers": [ { "uri": "gone.bin", "byteLength": 4 } ] });
    let result = SceneGraph::from_slice(document.to_string().into_bytes(), &mut io);
    assert!(matches!(result, Err(Error::Io { ref path, .. }) if path == "gone.bin"));
}

#[test]
fn buffer_without_source_fails() {
    let result = decode_json(json!({ "buffers": [ { "byteLength": 4 } ] }));
    assert!(matches!(result, Err(Error::MissingBufferSource { buffer: 0 })));

    // Only buffer 0 may be backed by the BIN chunk.
    let document = json!({ "buffers": [ { "byteLength": 4 }, { "byteLength": 4 } ] });
    let bytes = glb(&document.to_string(), &[0; 4]);
    assert!(matches!(
        SceneGraph::from_slice(bytes, &mut NoExternalFiles),
        Err(Error::MissingBufferSource { buffer: 1 })
    ));
}

#[test]
fn glb_mixes_chunk_and_external_buffers() {
    let mut io = MemoryReader::default().with("extra.bin", vec![5u8; 8]);
    let document = json!({
        "buffers": [ { "byteLength": 4 }, { "uri": "extra.bin", "byteLength": 8 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 4 },
            { "buffer": 1, "byteOffset": 4, "byteLength": 4 }
        ]
    });
    let bytes = glb(&document.to_string(), &[1, 2, 3, 4]);
    let chunk = frame(&bytes).expect("frame").bin.expect("bin");
    let scene = SceneGraph::from_slice(bytes, &mut io).expect("decode");

    assert_eq!(scene.buffer_views()[0].offset, chunk.start);
    assert_eq!(scene.buffer_views()[1].offset, 4);
    assert_eq!(scene.view_bytes(0), Some(&[1u8, 2, 3, 4][..]));
    assert_eq!(scene.view_bytes(1), Some(&[5u8; 4][..]));
}

#[test]
fn metallic_roughness_texture_binds_both_slots() {
    let scene = decode_json(json!({
        "textures": [ {}, {}, {} ],
        "materials": [ {
            "pbrMetallicRoughness": { "metallicRoughnessTexture": { "index": 2 } }
        } ]
    }))
    .expect("decode");

    let material = &scene.materials()[0];
    assert_eq!(material.texture(crate::TextureSlot::Metalness), Some(2));
    assert_eq!(material.texture(crate::TextureSlot::Roughness), Some(2));
    assert_eq!(material.texture(crate::TextureSlot::Diffuse), None);
}

#[test]
fn short_matrix_fails() {
    let result = decode_json(json!({
        "nodes": [ { "matrix": [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0] } ]
    }));
    assert!(matches!(
        result,
        Err(Error::InvalidMatrixSize { node: 0, found: 12 })
    ));
}

#[test]
fn node_matrix_is_copied_verbatim() {
    let matrix: Vec<f32> = (0..16).map(|i| i as f32 * 0.5).collect();
    let scene = decode_json(json!({
        "nodes": [ { "matrix": matrix, "translation": [9, 9, 9] } ]
    }))
    .expect("decode");
    assert_eq!(scene.nodes()[0].transform.to_vec(), matrix);
}

#[test]
fn transform_vectors_must_have_exact_length() {
    let cases = [
        (json!({ "translation": [1, 2] }), "translation", 3, 2),
        (json!({ "rotation": [0, 0, 1] }), "rotation", 4, 3),
        (json!({ "scale": [1, 1, 1, 1] }), "scale", 3, 4),
    ];
    for (node, name, want, got) in cases {
        let result = decode_json(json!({ "nodes": [ {}, node ] }));
        match result {
            Err(Error::InvalidVectorSize {
                entity,
                index,
                field,
                expected,
                found,
            }) => {
                assert_eq!(entity, "node");
                assert_eq!(index, 1);
                assert_eq!(field, name);
                assert_eq!(expected, want);
                assert_eq!(found, got);
            }
            other => panic!("expected InvalidVectorSize for {name}, got {other:?}"),
        }
    }
}

#[test]
fn meshes_share_one_primitive_array() {
    let scene = decode_json(json!({
        "accessors": [ { "componentType": 5126, "type": "VEC3", "count": 3 } ],
        "meshes": [
            { "primitives": [ { "attributes": { "POSITION": 0 } }, { "attributes": {} } ] },
            { "primitives": [] },
            { "primitives": [ { "attributes": { "POSITION": 0 }, "mode": 1 } ] }
        ],
        "nodes": [ { "mesh": 2 }, { "mesh": 0 }, {} ]
    }))
    .expect("decode");

    let spans: Vec<_> = scene.meshes().iter().map(|m| m.primitives).collect();
    assert_eq!(spans, vec![Span::new(0, 2), Span::new(2, 0), Span::new(2, 1)]);
    let total: usize = scene.meshes().iter().map(|m| m.primitives.len()).sum();
    assert_eq!(total, scene.primitives().len());

    assert_eq!(scene.nodes()[0].primitives, Span::new(2, 1));
    assert_eq!(scene.nodes()[1].primitives, Span::new(0, 2));
    assert_eq!(scene.nodes()[2].primitives, Span::default());
    let third = scene.mesh_primitives(&scene.meshes()[2]);
    assert_eq!(third[0].mode, DrawMode::Lines);
}

#[test]
fn primitive_attributes_map_to_slots() {
    let accessors: Vec<_> = (0..8)
        .map(|_| json!({ "componentType": 5126, "type": "VEC4", "count": 1 }))
        .collect();
    let scene = decode_json(json!({
        "accessors": accessors,
        "materials": [ {} ],
        "meshes": [ { "primitives": [ {
            "attributes": {
                "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2, "COLOR_0": 3,
                "TANGENT": 4, "JOINTS_0": 5, "WEIGHTS_0": 6, "TEXCOORD_1": 7, "_CUSTOM": 7
            },
            "indices": 7,
            "material": 0
        } ] } ]
    }))
    .expect("decode");

    let primitive = &scene.primitives()[0];
    for (slot, attribute) in Attribute::ALL.iter().enumerate() {
        assert_eq!(primitive.attribute(*attribute), Some(slot as u32), "{attribute:?}");
    }
    assert_eq!(primitive.indices, Some(7));
    assert_eq!(primitive.material, Some(0));
    assert_eq!(primitive.mode, DrawMode::Triangles);
}

#[test]
fn draw_modes_map_and_reject_unknown_codes() {
    let primitives: Vec<_> = (0..7).map(|mode| json!({ "attributes": {}, "mode": mode })).collect();
    let scene = decode_json(json!({ "meshes": [ { "primitives": primitives } ] }))
        .expect("decode");
    let modes: Vec<_> = scene.primitives().iter().map(|p| p.mode).collect();
    assert_eq!(
        modes,
        vec![
            DrawMode::Points,
            DrawMode::Lines,
            DrawMode::LineLoop,
            DrawMode::LineStrip,
            DrawMode::Triangles,
            DrawMode::TriangleStrip,
            DrawMode::TriangleFan,
        ]
    );

    let result = decode_json(json!({
        "meshes": [ { "primitives": [ { "attributes": {}, "mode": 7 } ] } ]
    }));
    assert!(matches!(result, Err(Error::UnknownDrawMode { value: 7 })));
}

#[test]
fn children_and_skins_use_shared_index_pools() {
    let scene = decode_json(json!({
        "accessors": [ { "componentType": 5126, "type": "MAT4", "count": 2 } ],
        "nodes": [
            { "children": [1, 2] },
            { "children": [3] },
            {},
            { "skin": 0 }
        ],
        "skins": [
            { "joints": [1, 3], "skeleton": 0, "inverseBindMatrices": 0 },
            { "joints": [2] }
        ]
    }))
    .expect("decode");

    assert_eq!(scene.node_children(&scene.nodes()[0]), &[1, 2]);
    assert_eq!(scene.node_children(&scene.nodes()[1]), &[3]);
    assert!(scene.node_children(&scene.nodes()[2]).is_empty());
    assert_eq!(scene.nodes()[3].skin, Some(0));
    for node in scene.nodes() {
        for &child in scene.node_children(node) {
            assert!((child as usize) < scene.nodes().len());
        }
    }

    let skin = &scene.skins()[0];
    assert_eq!(scene.skin_joints(skin), &[1, 3]);
    assert_eq!(skin.skeleton, Some(0));
    assert_eq!(skin.inverse_bind_matrices, Some(0));
    assert_eq!(scene.skin_joints(&scene.skins()[1]), &[2]);
    assert_eq!(scene.skins()[1].skeleton, None);
}

#[test]
fn unknown_members_are_skipped() {
    let scene = decode_json(json!({
        "asset": { "version": "2.0", "generator": "test", "extras": { "deep": [[{}]] } },
        "extensionsUsed": ["KHR_materials_unlit"],
        "scenes": [ { "nodes": [0] } ],
        "scene": 0,
        "nodes": [ {
            "name": "root",
            "extensions": { "EXT_x": { "nodes": [1, 2, 3] } },
            "translation": [4, 5, 6],
            "extras": [1, { "a": [] }]
        } ]
    }))
    .expect("decode");
    assert_eq!(scene.nodes().len(), 1);
    assert_approx(scene.nodes()[0].transform[13], 5.0);
}

#[test]
fn decoding_is_idempotent() {
    let document = json!({
        "accessors": [ { "componentType": 5126, "type": "VEC3", "count": 3,
                         "min": [0, 0, 0], "max": [1, 1, 1] } ],
        "samplers": [ { "magFilter": 9728, "wrapS": 33071 } ],
        "textures": [ { "sampler": 0 } ],
        "materials": [ { "emissiveFactor": [1, 0.5, 0] } ],
        "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 }, "material": 0 } ] } ],
        "nodes": [ { "mesh": 0, "rotation": [0, 0.7071068, 0, 0.7071068], "children": [1] }, {} ]
    })
    .to_string()
    .into_bytes();

    let first = SceneGraph::from_slice(document.clone(), &mut NoExternalFiles).expect("first");
    let second = SceneGraph::from_slice(document, &mut NoExternalFiles).expect("second");
    assert_eq!(first.layout(), second.layout());
    assert_eq!(first.accessors(), second.accessors());
    assert_eq!(first.samplers(), second.samplers());
    assert_eq!(first.textures(), second.textures());
    assert_eq!(first.materials(), second.materials());
    assert_eq!(first.meshes(), second.meshes());
    assert_eq!(first.primitives(), second.primitives());
    assert_eq!(first.nodes(), second.nodes());
}

#[test]
fn layout_sections_match_entity_counts() {
    let scene = decode_json(json!({
        "accessors": [ { "componentType": 5126, "type": "SCALAR", "count": 1 } ],
        "meshes": [ { "primitives": [ { "attributes": {} }, { "attributes": {} } ] } ],
        "nodes": [ { "children": [1] }, {} ],
        "animations": [ {
            "channels": [ { "sampler": 0, "target": { "node": 0, "path": "scale" } } ],
            "samplers": [ { "input": 0, "output": 0 } ]
        } ]
    }))
    .expect("decode");

    let layout = scene.layout();
    let count = |kind| layout.section(kind).expect("section").count;
    assert_eq!(count(SectionKind::Accessors), 1);
    assert_eq!(count(SectionKind::Meshes), 1);
    assert_eq!(count(SectionKind::Primitives), 2);
    assert_eq!(count(SectionKind::Nodes), 2);
    assert_eq!(count(SectionKind::NodeChildren), 1);
    assert_eq!(count(SectionKind::Channels), 1);
    assert_eq!(count(SectionKind::AnimationSamplers), 1);
    assert_eq!(count(SectionKind::Skins), 0);

    let mut end = 0;
    for section in &layout.sections {
        assert!(section.offset >= end, "{:?} overlaps", section.kind);
        end = section.offset + section.bytes;
    }
    assert_eq!(scene.footprint(), end);
}

#[test]
fn root_must_be_an_object() {
    for text in ["[]", "1", r#""gltf""#] {
        let result = SceneGraph::from_slice(text.as_bytes().to_vec(), &mut NoExternalFiles);
        assert!(matches!(result, Err(Error::InvalidRoot)), "{text}");
    }
}

#[test]
fn recognized_arrays_must_be_arrays() {
    let result = decode_json(json!({ "nodes": {} }));
    assert!(matches!(
        result,
        Err(Error::UnexpectedToken {
            expected: "array",
            ..
        })
    ));
}

#[test]
fn asset_version_is_checked() {
    for version in ["1.0", "3.0", "2", "two"] {
        let result = decode_json(json!({ "asset": { "version": version } }));
        assert!(
            matches!(result, Err(Error::UnsupportedVersion { ref value }) if value == version),
            "{version}"
        );
    }
    assert!(decode_json(json!({ "asset": { "version": "2.1" } })).is_ok());
}

#[test]
fn byte_order_mark_is_stripped() {
    let mut bytes = "\u{feff}".as_bytes().to_vec();
    bytes.extend_from_slice(br#"{"nodes": [{}]}"#);
    let scene = SceneGraph::from_slice(bytes, &mut NoExternalFiles).expect("decode");
    assert_eq!(scene.nodes().len(), 1);
}

#[test]
fn invalid_utf8_is_malformed() {
    let result = SceneGraph::from_slice(vec![b'{', 0xff, b'}'], &mut NoExternalFiles);
    assert!(matches!(result, Err(Error::MalformedContainer { .. })));
}

#[test]
fn token_budget_comes_from_options() {
    let document = json!({ "nodes": [ {}, {}, {} ] }).to_string().into_bytes();
    let options = DecodeOptions {
        max_tokens: Some(4),
        ..DecodeOptions::default()
    };
    let result =
        SceneGraph::from_slice_with_options(document.clone(), &mut NoExternalFiles, &options);
    assert!(matches!(result, Err(Error::Tokenize { .. })));

    let options = DecodeOptions {
        max_tokens: Some(6),
        ..DecodeOptions::default()
    };
    assert!(SceneGraph::from_slice_with_options(document, &mut NoExternalFiles, &options).is_ok());
}

struct CountingTokenizer {
    calls: Cell<usize>,
}

impl Tokenize for CountingTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, Error> {
        self.calls.set(self.calls.get() + 1);
        JsonTokenizer::new().tokenize(text)
    }
}

#[test]
fn caller_supplied_tokenizer_drives_decode() {
    let tokenizer = CountingTokenizer {
        calls: Cell::new(0),
    };
    let source: Arc<[u8]> = Arc::from(br#"{"nodes": [{"scale": [2, 2, 2]}]}"#.as_slice());
    let scene = decode_with(
        source,
        &tokenizer,
        &mut NoExternalFiles,
        &DecodeOptions::default(),
    )
    .expect("decode");
    assert_eq!(tokenizer.calls.get(), 1);
    assert_approx(scene.nodes()[0].transform[0], 2.0);
}

/// Hands back a fixed token array regardless of the text.
struct FixedTokenizer(Vec<Token>);

impl Tokenize for FixedTokenizer {
    fn tokenize(&self, _text: &str) -> Result<Vec<Token>, Error> {
        Ok(self.0.clone())
    }
}

#[test]
fn malformed_tokens_from_a_custom_tokenizer_are_errors() {
    let source: Arc<[u8]> = Arc::from(b"{}".as_slice());
    let object = |size| Token {
        kind: TokenKind::Object,
        start: 0,
        end: 2,
        size,
    };
    let key = Token {
        kind: TokenKind::String,
        start: 1,
        end: 999,
        size: 0,
    };
    let empty_key = Token {
        kind: TokenKind::String,
        start: 0,
        end: 0,
        size: 0,
    };
    let huge = Token {
        kind: TokenKind::Array,
        start: 0,
        end: 2,
        size: usize::MAX,
    };

    let cases = [
        vec![object(1), key],
        vec![object(usize::MAX)],
        vec![object(1), empty_key, huge],
    ];
    for tokens in cases {
        let result = decode_with(
            source.clone(),
            &FixedTokenizer(tokens.clone()),
            &mut NoExternalFiles,
            &DecodeOptions::default(),
        );
        assert!(
            matches!(result, Err(Error::UnexpectedToken { .. })),
            "{tokens:?}: {result:?}"
        );
    }
}

#[test]
fn out_of_range_references_are_rejected() {
    let cases = [
        (json!({ "nodes": [ { "children": [5] } ] }), "node", 5),
        (json!({ "nodes": [ { "skin": 0 } ] }), "skin", 0),
        (json!({ "nodes": [ { "mesh": 1 } ], "meshes": [ { "primitives": [] } ] }), "mesh", 1),
        (json!({ "skins": [ { "joints": [0] } ] }), "node", 0),
        (json!({ "skins": [ { "joints": [], "inverseBindMatrices": 3 } ] }), "accessor", 3),
        (json!({ "accessors": [ { "componentType": 5126, "type": "SCALAR", "count": 1, "bufferView": 0 } ] }), "bufferView", 0),
        (json!({ "textures": [ { "source": 1 } ] }), "image", 1),
        (json!({ "materials": [ { "normalTexture": { "index": 0 } } ] }), "texture", 0),
        (json!({ "meshes": [ { "primitives": [ { "attributes": { "NORMAL": 2 } } ] } ] }), "accessor", 2),
        (json!({ "meshes": [ { "primitives": [ { "attributes": {}, "material": 0 } ] } ] }), "material", 0),
        (json!({ "textures": [ { "sampler": 4 } ] }), "sampler", 4),
    ];
    for (document, want_kind, want_index) in cases {
        let text = document.to_string();
        match decode_json(document) {
            Err(Error::InvalidReference { kind, index, .. }) => {
                assert_eq!(kind, want_kind, "{text}");
                assert_eq!(index, want_index, "{text}");
            }
            other => panic!("expected InvalidReference for {text}, got {other:?}"),
        }
    }
}

#[test]
fn view_buffer_reference_is_checked() {
    let bytes = glb(
        &json!({
            "buffers": [ { "byteLength": 4 } ],
            "bufferViews": [ { "buffer": 3, "byteLength": 4 } ]
        })
        .to_string(),
        &[0; 4],
    );
    assert!(matches!(
        SceneGraph::from_slice(bytes, &mut NoExternalFiles),
        Err(Error::InvalidReference {
            kind: "buffer",
            index: 3,
            count: 1
        })
    ));
}
