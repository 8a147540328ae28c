//! Scene file loading through the public API

use std::path::PathBuf;
use std::rc::Rc;

use approx::assert_relative_eq;
use ovo_engine::assets::scene_file::packing::{pack_half_2x16, pack_snorm_3x10_1x2};
use ovo_engine::assets::scene_file::{
    ChunkType, HullRecord, LightRecord, LightSubtype, LodRecord, MaterialRecord, MeshRecord, NodeRecord,
    PayloadWriter, SCENE_ROOT_NAME,
};
use ovo_engine::core::config::LoaderConfig;
use ovo_engine::prelude::*;
use ovo_engine::render::LightVariant;

/// Fresh directory under the system temp dir for one test
fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ovo_engine_{test}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_scene(test: &str, writer: &ChunkWriter) -> PathBuf {
    let path = scratch_dir(test).join("scene.ovo");
    writer.write_to_file(&path).unwrap();
    path
}

fn mesh(name: &str, children: u32, material: Option<&str>) -> MeshRecord {
    MeshRecord::new(
        NodeRecord::new(name, children),
        material.map(str::to_string),
        LodRecord::triangle(),
    )
}

fn light(name: &str, subtype: LightSubtype, radius: f32) -> LightRecord {
    LightRecord {
        node: NodeRecord::new(name, 0),
        target: "[none]".to_string(),
        subtype,
        color: Vec3::new(1.0, 1.0, 0.9),
        radius,
        direction: Vec3::new(0.0, -1.0, 0.0),
        cutoff: 35.0,
        exponent: 10.0,
    }
}

#[test]
fn test_root_with_two_meshes_builds_three_nodes() {
    let mut writer = ChunkWriter::new();
    writer
        .version(8)
        .node(&NodeRecord::new("[root]", 2))
        .mesh(&mesh("Pawn", 0, None), &[])
        .mesh(&mesh("Rook", 0, None), &[]);
    let path = write_scene("three_nodes", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let scene_root = scene.find_by_name(scene.root(), SCENE_ROOT_NAME).unwrap();
    let file_root = scene.find_by_name(scene_root, "[root]").unwrap();

    assert_eq!(scene.node_count(file_root), 3);
    let children = scene.node(file_root).unwrap().children();
    assert_eq!(children.len(), 2);
    for &child in children {
        let node = scene.node(child).unwrap();
        assert_eq!(node.type_name(), "Mesh");
        assert_eq!(node.parent(), Some(file_root));
    }
}

#[test]
fn test_base_matrix_is_taken_from_the_file() {
    let matrix = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
    let mut writer = ChunkWriter::new();
    writer.node(&NodeRecord::new("moved", 0).with_matrix(matrix));
    let path = write_scene("base_matrix", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let node = scene.find_by_name(scene.root(), "moved").unwrap();
    assert_relative_eq!(*scene.node(node).unwrap().base_matrix(), matrix);
    assert_relative_eq!(scene.node(node).unwrap().local_matrix(), matrix);
}

#[test]
fn test_point_light_radius_is_scaled_down() {
    let mut writer = ChunkWriter::new();
    writer
        .node(&NodeRecord::new("[root]", 2))
        .light(&light("Omni", LightSubtype::Point, 1000.0))
        .light(&light("Spot", LightSubtype::Spot, 1000.0));
    let path = write_scene("point_radius", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let omni = scene.find_by_name(scene.root(), "Omni").unwrap();
    let omni = scene.node(omni).unwrap();
    assert_eq!(omni.type_name(), "PointLight");
    match omni.as_light().unwrap().variant {
        LightVariant::Point { radius } => assert_relative_eq!(radius, 1000.0 / 250.0),
        ref other => panic!("expected a point light, got {other:?}"),
    }

    let spot = scene.find_by_name(scene.root(), "Spot").unwrap();
    let spot = scene.node(spot).unwrap().as_light().unwrap();
    assert_relative_eq!(spot.params().constant_attenuation, 0.1);
    assert_relative_eq!(spot.params().spot_cutoff, 35.0);
}

#[test]
fn test_radius_divisor_comes_from_config() {
    let mut writer = ChunkWriter::new();
    writer.light(&light("Omni", LightSubtype::Point, 100.0));
    let path = write_scene("radius_divisor", &writer);

    let config = LoaderConfig {
        point_light_radius_divisor: 10.0,
        ..LoaderConfig::default()
    };
    let scene = SceneLoader::new(&config).load_scene(&path, 8).unwrap();
    let omni = scene.find_by_name(scene.root(), "Omni").unwrap();
    assert_eq!(
        scene.node(omni).unwrap().as_light().unwrap().variant,
        LightVariant::Point { radius: 10.0 }
    );
}

#[test]
fn test_materials_are_mapped_and_shared() {
    let mut material = MaterialRecord::new("Ebony", Vec3::new(0.1, 0.1, 0.1));
    material.roughness = 0.25;
    material.emission = Vec3::new(0.0, 0.0, 0.2);
    material.alpha = 0.5;

    let mut writer = ChunkWriter::new();
    writer
        .material(&material)
        .node(&NodeRecord::new("[root]", 2))
        .mesh(&mesh("Knight", 0, Some("Ebony")), &[])
        .mesh(&mesh("Bishop", 0, Some("Ebony")), &[]);
    let path = write_scene("materials", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let knight = scene.find_by_name(scene.root(), "Knight").unwrap();
    let bishop = scene.find_by_name(scene.root(), "Bishop").unwrap();
    let knight = scene.node(knight).unwrap().as_mesh().unwrap().material();
    let bishop = scene.node(bishop).unwrap().as_mesh().unwrap().material();
    assert!(Rc::ptr_eq(knight, bishop));

    let material = knight.borrow();
    assert_eq!(material.name, "Ebony");
    assert_relative_eq!(material.ambient, Vec3::repeat(0.1));
    assert_relative_eq!(material.specular, Vec3::repeat(0.1));
    assert_relative_eq!(material.emission, Vec3::new(0.0, 0.0, 0.2));
    assert_relative_eq!(material.shininess, 64.0);
    assert_relative_eq!(material.alpha, 0.5);
}

#[test]
fn test_textures_resolve_next_to_the_scene_file() {
    let dir = scratch_dir("textures");
    image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]))
        .save(dir.join("wood.png"))
        .unwrap();

    let mut wood = MaterialRecord::new("Wood", Vec3::repeat(1.0));
    wood.albedo_map = Some("wood.png".to_string());
    let mut other = MaterialRecord::new("Wood2", Vec3::repeat(0.5));
    other.albedo_map = Some("wood.png".to_string());
    let mut broken = MaterialRecord::new("Broken", Vec3::repeat(1.0));
    broken.albedo_map = Some("missing.png".to_string());

    let mut writer = ChunkWriter::new();
    writer
        .material(&wood)
        .material(&other)
        .material(&broken)
        .node(&NodeRecord::new("[root]", 3))
        .mesh(&mesh("Board", 0, Some("Wood")), &[])
        .mesh(&mesh("Frame", 0, Some("Wood2")), &[])
        .mesh(&mesh("Ghost", 0, Some("Broken")), &[]);
    let path = dir.join("scene.ovo");
    writer.write_to_file(&path).unwrap();

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let texture_of = |name: &str| {
        let node = scene.find_by_name(scene.root(), name).unwrap();
        scene
            .node(node)
            .unwrap()
            .as_mesh()
            .unwrap()
            .material()
            .borrow()
            .texture
            .clone()
    };

    let board = texture_of("Board").unwrap();
    assert_eq!((board.image().width, board.image().height), (2, 2));
    assert_eq!(board.image().pixel(0, 0), Some([200, 100, 50, 255]));
    assert!(Rc::ptr_eq(&board, &texture_of("Frame").unwrap()));
    assert!(texture_of("Ghost").is_none());
}

#[test]
fn test_unknown_chunks_are_skipped_without_losing_alignment() {
    let mut writer = ChunkWriter::new();
    writer
        .node(&NodeRecord::new("[root]", 2))
        .raw_chunk(77, &[0xAB; 13])
        .mesh(&mesh("A", 0, None), &[])
        .raw_chunk(3, &[])
        .mesh(&mesh("B", 0, None), &[]);
    let path = write_scene("unknown_chunks", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let root = scene.find_by_name(scene.root(), "[root]").unwrap();
    assert_eq!(scene.node(root).unwrap().children().len(), 2);
}

#[test]
fn test_only_the_first_lod_is_kept() {
    let mut big = LodRecord::triangle();
    big.positions.push(Vec3::new(1.0, 0.0, -1.0));
    big.normals.push(Vec3::y());
    big.uvs.push(Vec2::zeros());
    big.faces.push([1, 3, 2]);

    let mut record = mesh("Queen", 0, None);
    record.hulls = Some(vec![HullRecord { vertices: 4, faces: 4 }]);

    let mut writer = ChunkWriter::new();
    writer
        .node(&NodeRecord::new("[root]", 2))
        .mesh(&record, &[big.clone(), big])
        .node(&NodeRecord::new("after", 0));
    let path = write_scene("lods", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let queen = scene.find_by_name(scene.root(), "Queen").unwrap();
    let geometry = scene.node(queen).unwrap().as_mesh().unwrap().geometry().clone();
    assert_eq!(geometry.face_count(), 1);
    assert_eq!(geometry.vertex_count(), 3);
    assert!(scene.find_by_name(scene.root(), "after").is_some());
}

#[test]
fn test_invalid_face_indices_leave_an_empty_mesh() {
    let mut lod = LodRecord::triangle();
    lod.faces.push([0, 1, 9]);
    let mut writer = ChunkWriter::new();
    writer.mesh(
        &MeshRecord::new(NodeRecord::new("Broken", 0), None, lod),
        &[],
    );
    let path = write_scene("invalid_faces", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let broken = scene.find_by_name(scene.root(), "Broken").unwrap();
    assert!(scene.node(broken).unwrap().as_mesh().unwrap().geometry().is_empty());
}

#[test]
fn test_truncated_mesh_chunk_keeps_the_rest_of_the_scene() {
    let mut cut = ChunkWriter::new();
    cut.mesh(&mesh("Cut", 0, None), &[]);
    // Keep the chunk header out, drop the LOD tail; the new header carries the right size
    let bytes = cut.finish();

    let mut writer = ChunkWriter::new();
    writer
        .node(&NodeRecord::new("Board", 2))
        .mesh(&mesh("Good", 0, None), &[])
        .raw_chunk(ChunkType::Mesh as u32, &bytes[8..bytes.len() - 10])
        .node(&NodeRecord::new("After", 0));
    let path = write_scene("truncated_mesh", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let board = scene.find_by_name(scene.root(), "Board").unwrap();
    let good = scene.find_by_name(scene.root(), "Good").unwrap();
    let cut = scene.find_by_name(scene.root(), "Cut").unwrap();
    assert_eq!(scene.node(board).unwrap().children(), &[good, cut]);
    assert_eq!(
        scene.node(good).unwrap().as_mesh().unwrap().geometry().vertex_count(),
        3
    );
    assert!(scene.node(cut).unwrap().as_mesh().unwrap().geometry().is_empty());

    let after = scene.find_by_name(scene.root(), "After").unwrap();
    let scene_root = scene.find_by_name(scene.root(), SCENE_ROOT_NAME).unwrap();
    assert_eq!(scene.node(after).unwrap().parent(), Some(scene_root));
}

/// Mesh payload laid out by hand: three hulls of different sizes with
/// non-zero contents, then one LOD holding a single triangle
fn hand_written_mesh_with_hulls(name: &str) -> Vec<u8> {
    let mut payload = PayloadWriter::new();
    payload
        .put_cstring(name)
        .put_mat4(&Mat4::identity())
        .put_u32(0)
        .put_cstring("[none]")
        .put_u8(0)
        .put_cstring("[none]")
        .put_f32(1.5)
        .put_vec3(&Vec3::repeat(-1.0))
        .put_vec3(&Vec3::repeat(1.0))
        .put_u8(1);

    // 40 byte physics header, hull count, 20 bytes of padding
    for i in 0..10 {
        payload.put_f32(i as f32 + 0.5);
    }
    payload.put_u32(3);
    for _ in 0..5 {
        payload.put_u32(0xDEAD_BEEF);
    }
    for (vertices, faces) in [(4u32, 4u32), (9, 14), (1, 0)] {
        payload.put_u32(vertices).put_u32(faces);
        payload.put_vec3(&Vec3::new(0.25, 0.5, 0.75));
        for v in 0..vertices {
            payload.put_vec3(&Vec3::repeat(v as f32));
        }
        for f in 0..faces {
            payload.put_u32(f).put_u32(f + 1).put_u32(f + 2);
        }
    }

    let positions = [
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
    ];
    payload.put_u32(1).put_u32(3).put_u32(1);
    for position in &positions {
        payload
            .put_vec3(position)
            .put_u32(pack_snorm_3x10_1x2(&Vec3::z()))
            .put_u32(pack_half_2x16(&Vec2::new(0.5, 0.5)))
            .put_u32(0);
    }
    payload.put_u32(0).put_u32(1).put_u32(2);
    payload.into_bytes()
}

#[test]
fn test_hulls_of_different_sizes_keep_the_next_chunk_aligned() {
    let mut writer = ChunkWriter::new();
    writer
        .node(&NodeRecord::new("[root]", 3))
        .raw_chunk(ChunkType::Mesh as u32, &hand_written_mesh_with_hulls("Knight"))
        .mesh(&mesh("Bishop", 0, None), &[])
        .node(&NodeRecord::new("After", 0));
    let path = write_scene("hull_alignment", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let root = scene.find_by_name(scene.root(), "[root]").unwrap();
    let knight = scene.find_by_name(root, "Knight").unwrap();
    let bishop = scene.find_by_name(root, "Bishop").unwrap();
    let after = scene.find_by_name(root, "After").unwrap();
    assert_eq!(scene.node(root).unwrap().children(), &[knight, bishop, after]);

    let knight_geometry = scene.node(knight).unwrap().as_mesh().unwrap().geometry().clone();
    assert_eq!(knight_geometry.vertex_count(), 3);
    assert_eq!(knight_geometry.faces(), &[[0, 1, 2]]);
    assert_relative_eq!(knight_geometry.positions()[2], Vec3::new(0.0, 2.0, 0.0));
    assert_relative_eq!(knight_geometry.normals()[0], Vec3::z(), epsilon = 1e-6);
    assert_relative_eq!(knight_geometry.uvs()[1], Vec2::new(0.5, 0.5));

    let bishop_geometry = scene.node(bishop).unwrap().as_mesh().unwrap().geometry().clone();
    assert_eq!(bishop_geometry.positions(), LodRecord::triangle().positions.as_slice());
}

#[test]
fn test_material_texture_map_names_keep_the_next_chunk_aligned() {
    let mut ivory = MaterialRecord::new("ivory", Vec3::new(0.9, 0.9, 0.8));
    ivory.albedo_map = Some("ivory_albedo_missing.png".to_string());
    ivory.extra_maps = [
        "ivory_normal.png".to_string(),
        "ivory_height_map_long_name.png".to_string(),
        "r.png".to_string(),
        "ivory_metalness.png".to_string(),
    ];
    let mut ebony = MaterialRecord::new("ebony", Vec3::new(0.1, 0.05, 0.02));
    ebony.roughness = 0.25;
    ebony.extra_maps[1] = "ebony_height.png".to_string();

    let mut writer = ChunkWriter::new();
    writer
        .material(&ivory)
        .material(&ebony)
        .node(&NodeRecord::new("[root]", 2))
        .mesh(&mesh("White", 0, Some("ivory")), &[])
        .mesh(&mesh("Black", 0, Some("ebony")), &[]);
    let path = write_scene("material_maps", &writer);

    let scene = SceneLoader::default().load_scene(&path, 8).unwrap();
    let material_of = |name: &str| {
        let node = scene.find_by_name(scene.root(), name).unwrap();
        scene.node(node).unwrap().as_mesh().unwrap().material().borrow().clone()
    };

    let white = material_of("White");
    assert_eq!(white.name, "ivory");
    assert_relative_eq!(white.diffuse, Vec3::new(0.9, 0.9, 0.8));
    assert!(white.texture.is_none());

    let black = material_of("Black");
    assert_eq!(black.name, "ebony");
    assert_relative_eq!(black.diffuse, Vec3::new(0.1, 0.05, 0.02));
    assert_relative_eq!(black.shininess, 64.0, epsilon = 1e-4);
}

#[test]
fn test_missing_file_is_fatal() {
    let path = scratch_dir("missing").join("does_not_exist.ovo");
    let err = SceneLoader::default().load_scene(&path, 8).unwrap_err();
    assert!(matches!(err, SceneFileError::Open { .. }));
}

#[test]
fn test_engine_loads_into_its_scene_and_renders() {
    let mut writer = ChunkWriter::new();
    writer
        .node(&NodeRecord::new("[root]", 3))
        .node(&NodeRecord::new("Camera", 0))
        .light(&light("Sun", LightSubtype::Directional, 0.0))
        .mesh(&mesh("Board", 0, None), &[]);
    let path = write_scene("engine_load", &writer);

    let config = EngineConfig::default().with_window_size(32, 32);
    let mut engine = Engine::new(config, Box::new(SoftwareRasterizer::new(32, 32, 8))).unwrap();
    engine.load_scene(&path).unwrap();

    // The file's "Camera" is a plain node; attach a real camera under it
    let holder = engine.find_object_by_name("Camera").unwrap();
    let scene = engine.scene_mut().unwrap();
    let camera = scene
        .spawn(holder, "Eye", NodeKind::Camera(Camera::new()))
        .unwrap();
    scene.node_mut(camera).unwrap().set_position(Vec3::new(0.0, 2.0, 3.0));

    assert!(matches!(
        engine.set_active_camera(holder),
        Err(EngineError::Scene(SceneError::NotACamera(_)))
    ));
    engine.set_active_camera(camera).unwrap();
    engine.clear_screen();
    engine.render().unwrap();
    engine.swap_buffers();
    assert_eq!(engine.frame_count(), 1);
}
