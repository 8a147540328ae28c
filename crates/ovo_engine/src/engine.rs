//! Core engine implementation
//!
//! The engine owns the active scene, the render backend and the periodic
//! timer. A frame is: drain input events, let the application update, clear,
//! [`Engine::render`], present.
//!
//! Rendering a frame:
//! 1. disable every light slot, then flatten and sort the scene
//! 2. draw each entry with `inverse(camera world) * entry world`
//! 3. redraw shadow-casting meshes squashed onto the ground in flat black
//!    with a less-or-equal depth test
//! 4. draw the FPS counter and the status text in window coordinates

use std::path::Path;
use std::time::Duration;

use crate::application::Application;
use crate::assets::scene_file::{SceneFileError, SceneLoader};
use crate::core::config::{ConfigError, EngineConfig};
use crate::events::{EngineEvent, EventQueue};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3, Vec4};
use crate::foundation::time::{TickTimer, Timer};
use crate::input::{pick_color_from_pixel, window_to_framebuffer, ButtonState, MouseButton, SpecialKey};
use crate::render::{
    BackendResult, ClearFlags, DepthFunc, DrawMode, Drawable, Material, MaterialOverride, RenderBackend,
    RenderError, SharedMaterial,
};
use crate::scene::{Node, NodeId, ObjectId, RenderList, Scene, SceneError};
use thiserror::Error;

/// Character key handler: `(engine, key, x, y)`
pub type KeyboardCallback = Box<dyn FnMut(&mut Engine, char, i32, i32)>;
/// Special key handler: `(engine, key, x, y)`
pub type SpecialCallback = Box<dyn FnMut(&mut Engine, SpecialKey, i32, i32)>;
/// Mouse handler: `(engine, button, state, x, y)`
pub type MouseCallback = Box<dyn FnMut(&mut Engine, MouseButton, ButtonState, i32, i32)>;
/// Handler run on every timer tick
pub type BlinkCallback = Box<dyn FnMut(&mut Engine)>;

/// Overlay text inset from the left edge
const OVERLAY_MARGIN_X: f32 = 16.0;
/// Baseline of the FPS counter
const FPS_TEXT_Y: f32 = 5.0;
/// Distance of the status text baseline from the top edge
const STATUS_TEXT_TOP_OFFSET: f32 = 32.0;

/// Main engine struct
pub struct Engine {
    config: EngineConfig,
    backend: Box<dyn RenderBackend>,
    max_lights: u32,
    scene: Option<Scene>,
    active_camera: Option<NodeId>,
    render_list: RenderList,
    shadow_material: SharedMaterial,
    screen_text: String,
    window_size: (u32, u32),
    events: EventQueue,
    frame_timer: Timer,
    tick_timer: TickTimer,
    ticks_in_sample: u32,
    frames_in_sample: u32,
    fps: u32,
    frame_count: u64,
    running: bool,
    keyboard_callback: Option<KeyboardCallback>,
    special_callback: Option<SpecialCallback>,
    mouse_callback: Option<MouseCallback>,
    blink_callback: Option<BlinkCallback>,
}

impl Engine {
    /// Create an engine drawing through `backend`
    pub fn new(config: EngineConfig, mut backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine: {} ({}x{})",
            config.window.title,
            config.window.width,
            config.window.height
        );

        let max_lights = config.render.max_lights.min(backend.max_lights());
        if max_lights < config.render.max_lights {
            log::warn!(
                "Backend has {} light slots but {} were configured; scenes get {max_lights}",
                backend.max_lights(),
                config.render.max_lights
            );
        }
        backend.resize(config.window.width, config.window.height);
        backend.set_clear_color(Vec3::from(config.render.clear_color));
        backend.set_global_ambient(Vec3::from(config.render.global_ambient));

        let tick_interval = Duration::from_millis(config.timing.tick_interval_ms);
        Ok(Self {
            window_size: (config.window.width, config.window.height),
            backend,
            max_lights,
            scene: None,
            active_camera: None,
            render_list: RenderList::new(),
            shadow_material: Material::shadow().into_shared(),
            screen_text: String::new(),
            events: EventQueue::new(),
            frame_timer: Timer::new(),
            tick_timer: TickTimer::new(tick_interval),
            ticks_in_sample: 0,
            frames_in_sample: 0,
            fps: 0,
            frame_count: 0,
            running: true,
            keyboard_callback: None,
            special_callback: None,
            mouse_callback: None,
            blink_callback: None,
            config,
        })
    }

    /// Run the main loop until [`Engine::stop`] or a close event
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        while self.running {
            self.update();
            self.frame_timer.update();
            let delta_time = self.frame_timer.delta_time();
            app.update(self, delta_time)
                .map_err(|e| EngineError::Application(format!("App update: {e}")))?;
            if !self.running {
                break;
            }

            self.clear_screen();
            self.render()?;
            self.swap_buffers();
        }

        app.cleanup(self);
        log::info!("Engine shutdown complete");
        Ok(())
    }

    // ---- scene ------------------------------------------------------------

    /// Empty scene with as many light slots as the backend can bind
    #[must_use]
    pub fn new_scene(&self) -> Scene {
        Scene::new(self.max_lights)
    }

    /// Replace the active scene, returning the previous one
    ///
    /// The active camera is cleared; pick one with [`Engine::set_active_camera`].
    /// A scene built with more light slots than the backend has is shrunk,
    /// and the lights that held the missing slots stay unbound.
    pub fn set_scene(&mut self, mut scene: Scene) -> Option<Scene> {
        scene.limit_light_slots(self.max_lights);
        log::info!("Scene set ({} nodes)", scene.len());
        self.active_camera = None;
        self.scene.replace(scene)
    }

    /// Remove and return the active scene
    pub fn take_scene(&mut self) -> Option<Scene> {
        self.active_camera = None;
        self.scene.take()
    }

    /// Active scene
    #[must_use]
    pub const fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Active scene, mutably
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Load a scene file under the active scene's root
    ///
    /// Creates an empty scene first when none is set. Returns the group node
    /// holding the file's contents.
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<NodeId, EngineError> {
        let loader = SceneLoader::new(&self.config.loader);
        let max_lights = self.max_lights;
        let scene = self.scene.get_or_insert_with(|| Scene::new(max_lights));
        let root = scene.root();
        Ok(loader.load(path, scene, root)?)
    }

    /// Make a camera node the one the scene is viewed through
    pub fn set_active_camera(&mut self, node: NodeId) -> Result<(), EngineError> {
        let (width, height) = self.window_size;
        let scene = self.scene.as_mut().ok_or(SceneError::NodeNotFound(node))?;
        let target = scene.node(node).ok_or(SceneError::NodeNotFound(node))?;
        if target.as_camera().is_none() {
            return Err(SceneError::NotACamera(node).into());
        }

        if let Some(previous) = self.active_camera.take() {
            if let Some(camera) = scene.node_mut(previous).and_then(Node::as_camera_mut) {
                camera.set_active(false);
            }
        }
        if let Some(camera) = scene.node_mut(node).and_then(Node::as_camera_mut) {
            camera.set_window_size(width, height);
            camera.set_active(true);
        }
        self.active_camera = Some(node);
        log::debug!("Active camera set to {node:?}");
        Ok(())
    }

    /// Camera the scene is viewed through
    #[must_use]
    pub const fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    /// First node named `name`
    #[must_use]
    pub fn find_object_by_name(&self, name: &str) -> Option<NodeId> {
        let scene = self.scene.as_ref()?;
        scene.find_by_name(scene.root(), name)
    }

    /// Node carrying object id `id`
    #[must_use]
    pub fn find_object_by_id(&self, id: ObjectId) -> Option<NodeId> {
        let scene = self.scene.as_ref()?;
        scene.find_by_id(scene.root(), id)
    }

    /// Remove a node and its subtree from the active scene
    ///
    /// Fails with [`SceneError::NodeNotFound`] and leaves the tree untouched
    /// when the node is not part of the scene tree.
    pub fn remove_object(&mut self, node: NodeId) -> Result<(), EngineError> {
        let scene = self.scene.as_mut().ok_or(SceneError::NodeNotFound(node))?;
        let root = scene.root();
        if !scene.contains(node) || (node != root && !scene.is_descendant(node, root)) {
            return Err(SceneError::NodeNotFound(node).into());
        }

        if let Some(camera) = self.active_camera {
            if camera == node || scene.is_descendant(camera, node) {
                log::debug!("Removing the active camera");
                self.active_camera = None;
            }
        }
        let removed = scene.remove_subtree(node)?;
        log::debug!("Removed {removed} nodes");
        Ok(())
    }

    /// Runtime position offset of a node
    #[must_use]
    pub fn node_position(&self, node: NodeId) -> Option<Vec3> {
        self.scene.as_ref()?.node(node).map(|n| *n.position())
    }

    /// Set the runtime position offset of a node
    pub fn set_node_position(&mut self, node: NodeId, position: Vec3) -> Result<(), EngineError> {
        let target = self
            .scene
            .as_mut()
            .and_then(|scene| scene.node_mut(node))
            .ok_or(SceneError::NodeNotFound(node))?;
        target.set_position(position);
        Ok(())
    }

    // ---- frame ------------------------------------------------------------

    /// Render one frame of the active scene
    ///
    /// Does nothing until both a scene and an active camera are set.
    pub fn render(&mut self) -> Result<(), EngineError> {
        let Self {
            backend,
            scene,
            active_camera,
            render_list,
            shadow_material,
            config,
            ..
        } = self;
        let (Some(scene), Some(camera)) = (scene.as_mut(), *active_camera) else {
            return Ok(());
        };
        let Some(camera_world) = scene.world_matrix(camera) else {
            return Ok(());
        };
        let Some(inverse_camera) = camera_world.try_inverse() else {
            log::warn!("Camera matrix is not invertible, skipping frame");
            return Ok(());
        };
        let backend = backend.as_mut();

        backend.set_lighting(true);
        backend.set_depth_func(DepthFunc::Less);
        for slot in 0..backend.max_lights() {
            backend.disable_light(slot);
        }

        render_list.clear();
        render_list.append(scene, scene.root(), &Mat4::identity());
        render_list.sort();

        for entry in render_list.iter() {
            if let Some(node) = scene.node(entry.node) {
                node.kind()
                    .draw(backend, &(inverse_camera * entry.world), DrawMode::Normal)?;
            }
        }

        draw_shadows(
            backend,
            scene,
            render_list,
            shadow_material,
            &inverse_camera,
            config.render.shadow_squash,
        )?;

        self.draw_overlay();
        self.frames_in_sample += 1;
        self.frame_count += 1;
        Ok(())
    }

    fn draw_overlay(&mut self) {
        let (width, height) = self.window_size;
        let color = Vec3::from(self.config.render.overlay_text_color);
        let backend = self.backend.as_mut();

        backend.clear(ClearFlags::DEPTH);
        backend.set_projection(&Mat4::orthographic_gl(
            0.0,
            width as f32,
            0.0,
            height as f32,
            -1.0,
            1.0,
        ));
        backend.load_modelview(&Mat4::identity());
        backend.set_lighting(false);

        backend.draw_text(OVERLAY_MARGIN_X, FPS_TEXT_Y, &format!("FPS: {}", self.fps), color);
        if !self.screen_text.is_empty() {
            backend.draw_text(
                OVERLAY_MARGIN_X,
                height as f32 - STATUS_TEXT_TOP_OFFSET,
                &self.screen_text,
                color,
            );
        }

        backend.set_lighting(true);
    }

    /// Clear color and depth
    pub fn clear_screen(&mut self) {
        self.backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
    }

    /// Present the finished frame
    pub fn swap_buffers(&mut self) {
        self.backend.present();
    }

    /// Dispatch pending events and run due timer ticks
    pub fn update(&mut self) {
        for event in self.events.drain() {
            self.dispatch(event);
        }
        for _ in 0..self.tick_timer.poll() {
            self.tick();
        }
    }

    fn dispatch(&mut self, event: EngineEvent) {
        log::trace!("Dispatching {event:?}");
        match event {
            EngineEvent::Key { key, x, y } => {
                if let Some(mut callback) = self.keyboard_callback.take() {
                    callback(self, key, x, y);
                    self.keyboard_callback.get_or_insert(callback);
                }
            }
            EngineEvent::Special { key, x, y } => {
                if let Some(mut callback) = self.special_callback.take() {
                    callback(self, key, x, y);
                    self.special_callback.get_or_insert(callback);
                }
            }
            EngineEvent::Mouse { button, state, x, y } => {
                if let Some(mut callback) = self.mouse_callback.take() {
                    callback(self, button, state, x, y);
                    self.mouse_callback.get_or_insert(callback);
                }
            }
            EngineEvent::Resize { width, height } => self.resize(width, height),
            EngineEvent::Close => self.stop(),
        }
    }

    /// Queue an input event for the next [`Engine::update`]
    pub fn push_event(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Apply a new window size to the backend and the active camera
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        log::debug!("Resize to {width}x{height}");
        self.window_size = (width, height);
        self.backend.resize(width, height);
        if let (Some(scene), Some(camera)) = (self.scene.as_mut(), self.active_camera) {
            if let Some(camera) = scene.node_mut(camera).and_then(Node::as_camera_mut) {
                camera.set_window_size(width, height);
            }
        }
    }

    /// Run one timer tick
    ///
    /// Every `ticks_per_fps_sample` ticks the FPS value becomes the number of
    /// frames rendered since the previous sample. The blink callback runs on
    /// every tick.
    pub fn tick(&mut self) {
        self.ticks_in_sample += 1;
        if self.ticks_in_sample >= self.config.timing.ticks_per_fps_sample {
            self.fps = self.frames_in_sample;
            self.frames_in_sample = 0;
            self.ticks_in_sample = 0;
            log::debug!("FPS: {}", self.fps);
        }

        if let Some(mut callback) = self.blink_callback.take() {
            callback(self);
            self.blink_callback.get_or_insert(callback);
        }
    }

    /// Whether the main loop keeps going
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the main loop after the current iteration
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Engine stop requested");
        }
        self.running = false;
    }

    /// Stop and release the active scene
    pub fn quit(&mut self) {
        self.stop();
        self.active_camera = None;
        if self.scene.take().is_some() {
            log::info!("Scene released");
        }
    }

    // ---- picking ----------------------------------------------------------

    /// Node drawn at window position `(x, y)` (origin top-left)
    ///
    /// Renders one extra pass with every node in its id color and reads back
    /// a single pixel. The backend's clear color and lighting are restored
    /// afterwards on every path.
    pub fn pick_at(&mut self, x: i32, y: i32) -> Result<Option<NodeId>, EngineError> {
        let (width, height) = self.window_size;
        let Some((fx, fy)) = window_to_framebuffer(x, y, width, height) else {
            return Ok(None);
        };
        if self.scene.is_none() || self.active_camera.is_none() {
            return Ok(None);
        }

        let clear_color = self.backend.clear_color();
        let pixel = self.picking_pass(fx, fy);

        self.backend.set_lighting(true);
        self.backend.set_clear_color(clear_color);
        self.backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        let Some(id) = pixel?.and_then(pick_color_from_pixel) else {
            return Ok(None);
        };
        log::debug!("Picked object {id} at ({x}, {y})");
        Ok(self.find_object_by_id(id))
    }

    fn picking_pass(&mut self, x: u32, y: u32) -> BackendResult<Option<[u8; 4]>> {
        let Self {
            backend,
            scene,
            active_camera,
            render_list,
            ..
        } = self;
        let (Some(scene), Some(camera)) = (scene.as_ref(), *active_camera) else {
            return Ok(None);
        };
        let Some(inverse_camera) = scene.world_matrix(camera).and_then(|m| m.try_inverse()) else {
            return Ok(None);
        };
        let backend = backend.as_mut();

        backend.set_clear_color(Vec3::zeros());
        backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        backend.set_lighting(false);
        backend.set_depth_func(DepthFunc::Less);

        render_list.clear();
        render_list.append(scene, scene.root(), &Mat4::identity());
        render_list.sort();
        for entry in render_list.iter() {
            if let Some(node) = scene.node(entry.node) {
                let mode = DrawMode::Picking(node.id().to_pick_color());
                node.kind().draw(backend, &(inverse_camera * entry.world), mode)?;
            }
        }

        Ok(backend.read_pixel(x, y))
    }

    // ---- settings and callbacks ---------------------------------------------

    /// Background color
    pub fn set_background(&mut self, color: Vec3) {
        self.backend.set_clear_color(color);
    }

    /// Status text drawn near the top of the window
    pub fn set_screen_text(&mut self, text: impl Into<String>) {
        self.screen_text = text.into();
    }

    /// Current status text
    #[must_use]
    pub fn screen_text(&self) -> &str {
        &self.screen_text
    }

    /// Register the character key handler
    pub fn set_keyboard_callback(&mut self, callback: impl FnMut(&mut Engine, char, i32, i32) + 'static) {
        self.keyboard_callback = Some(Box::new(callback));
    }

    /// Register the special key handler
    pub fn set_special_callback(
        &mut self,
        callback: impl FnMut(&mut Engine, SpecialKey, i32, i32) + 'static,
    ) {
        self.special_callback = Some(Box::new(callback));
    }

    /// Register the mouse handler
    pub fn set_mouse_callback(
        &mut self,
        callback: impl FnMut(&mut Engine, MouseButton, ButtonState, i32, i32) + 'static,
    ) {
        self.mouse_callback = Some(Box::new(callback));
    }

    /// Register the per-tick handler
    pub fn set_blink_callback(&mut self, callback: impl FnMut(&mut Engine) + 'static) {
        self.blink_callback = Some(Box::new(callback));
    }

    /// Drop the per-tick handler
    pub fn clear_blink_callback(&mut self) {
        self.blink_callback = None;
    }

    // ---- accessors --------------------------------------------------------

    /// Frames per second from the last complete sample
    #[must_use]
    pub const fn fps(&self) -> u32 {
        self.fps
    }

    /// Frames rendered since creation
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Window size in pixels
    #[must_use]
    pub const fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Light slots scenes of this engine hand out
    #[must_use]
    pub const fn max_lights(&self) -> u32 {
        self.max_lights
    }

    /// Engine configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render backend
    #[must_use]
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Render backend, mutably
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }
}

/// Redraw shadow casters as flat black decals squashed onto the ground
fn draw_shadows(
    backend: &mut dyn RenderBackend,
    scene: &mut Scene,
    render_list: &RenderList,
    shadow_material: &SharedMaterial,
    inverse_camera: &Mat4,
    squash: f32,
) -> BackendResult<()> {
    let flatten = Mat4::scaling(1.0, squash, 1.0);

    backend.set_depth_func(DepthFunc::LessEqual);
    backend.set_lighting(false);
    backend.set_color(Vec4::new(0.0, 0.0, 0.0, 1.0));

    let mut result = Ok(());
    for entry in render_list.iter() {
        let Some(mesh) = scene.node_mut(entry.node).and_then(Node::as_mesh_mut) else {
            continue;
        };
        if !mesh.casts_shadow || mesh.geometry().is_empty() {
            continue;
        }

        let lift = Mat4::new_translation(&Vec3::new(0.0, mesh.shadow_offset, 0.0));
        let decal = inverse_camera * lift * flatten * entry.world;
        let shadowed = MaterialOverride::new(mesh, shadow_material.clone());
        result = shadowed.draw(backend, &decal, DrawMode::Normal);
        drop(shadowed);
        if result.is_err() {
            break;
        }
    }

    backend.set_lighting(true);
    backend.set_depth_func(DepthFunc::Less);
    result
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene file could not be loaded
    #[error("Scene file error: {0}")]
    SceneFile(#[from] SceneFileError),

    /// Scene graph operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Backend failure
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Application callback failed
    #[error("Application error: {0}")]
    Application(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Camera, SoftwareRasterizer};
    use crate::scene::NodeKind;
    use std::cell::Cell;
    use std::rc::Rc;

    fn engine() -> Engine {
        let config = EngineConfig::default().with_window_size(64, 48);
        Engine::new(config, Box::new(SoftwareRasterizer::new(64, 48, 8))).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_max_lights(0);
        let result = Engine::new(config, Box::new(SoftwareRasterizer::new(4, 4, 8)));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_set_active_camera_requires_camera() {
        let mut engine = engine();
        let mut scene = engine.new_scene();
        let root = scene.root();
        let group = scene.spawn(root, "group", NodeKind::Group).unwrap();
        let cam = scene.spawn(root, "cam", NodeKind::Camera(Camera::new())).unwrap();
        engine.set_scene(scene);

        assert!(matches!(
            engine.set_active_camera(group),
            Err(EngineError::Scene(SceneError::NotACamera(_)))
        ));
        engine.set_active_camera(cam).unwrap();
        let camera = engine.scene().unwrap().node(cam).unwrap().as_camera().unwrap();
        assert!(camera.is_active());
        assert_eq!(camera.window_size(), (64, 48));
    }

    #[test]
    fn test_switching_camera_deactivates_previous() {
        let mut engine = engine();
        let mut scene = engine.new_scene();
        let root = scene.root();
        let a = scene.spawn(root, "a", NodeKind::Camera(Camera::new())).unwrap();
        let b = scene.spawn(root, "b", NodeKind::Camera(Camera::new())).unwrap();
        engine.set_scene(scene);
        engine.set_active_camera(a).unwrap();
        engine.set_active_camera(b).unwrap();

        let scene = engine.scene().unwrap();
        assert!(!scene.node(a).unwrap().as_camera().unwrap().is_active());
        assert!(scene.node(b).unwrap().as_camera().unwrap().is_active());
    }

    #[test]
    fn test_events_dispatch_to_callbacks() {
        let mut engine = engine();
        let keys = Rc::new(Cell::new(0));
        let seen = Rc::clone(&keys);
        engine.set_keyboard_callback(move |engine, key, _, _| {
            seen.set(seen.get() + 1);
            if key == 'q' {
                engine.stop();
            }
        });

        engine.push_event(EngineEvent::Key { key: 'a', x: 0, y: 0 });
        engine.push_event(EngineEvent::Key { key: 'q', x: 0, y: 0 });
        engine.push_event(EngineEvent::Resize { width: 32, height: 16 });
        engine.update();

        assert_eq!(keys.get(), 2);
        assert!(!engine.is_running());
        assert_eq!(engine.window_size(), (32, 16));
        assert_eq!(engine.backend().viewport(), (32, 16));
    }

    #[test]
    fn test_close_event_stops() {
        let mut engine = engine();
        engine.push_event(EngineEvent::Close);
        engine.update();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_blink_callback_runs_every_tick() {
        let mut engine = engine();
        let ticks = Rc::new(Cell::new(0));
        let seen = Rc::clone(&ticks);
        engine.set_blink_callback(move |_| seen.set(seen.get() + 1));
        for _ in 0..3 {
            engine.tick();
        }
        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn test_scenes_are_sized_to_the_backend_light_slots() {
        let config = EngineConfig::default().with_max_lights(8);
        let mut engine = Engine::new(config, Box::new(SoftwareRasterizer::new(4, 4, 2))).unwrap();
        assert_eq!(engine.max_lights(), 2);
        assert_eq!(engine.new_scene().light_slots().max(), 2);

        let mut scene = Scene::new(8);
        let root = scene.root();
        for i in 0..3 {
            scene
                .spawn(root, format!("l{i}"), NodeKind::Light(crate::render::Light::point()))
                .unwrap();
        }
        engine.set_scene(scene);
        let scene = engine.scene().unwrap();
        assert_eq!(scene.light_slots().max(), 2);
        assert_eq!(scene.light_slots().in_use(), 2);
    }

    #[test]
    fn test_quit_releases_scene() {
        let mut engine = engine();
        let scene = engine.new_scene();
        engine.set_scene(scene);
        engine.quit();
        assert!(engine.scene().is_none());
        assert!(!engine.is_running());
    }
}
