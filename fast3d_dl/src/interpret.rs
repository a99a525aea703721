//! A display list interpreter that resolves triangle commands into shaded triangles.
//!
//! [Interpreter] executes one command per [Interpreter::step] and delivers each
//! [Triangle] to a [TriangleSink]. [interpret_display_list] runs a root display list
//! to completion.

use bytemuck::{Pod, Zeroable};
use derivative::Derivative;
use log::{debug, trace, warn};

use crate::{
    asset::Asset,
    cmd::{DisplayListId, F3DCommand, Rgba32},
    config::InterpreterConfig,
    decode::decode_f3d_command,
    error::{CommandLocation, F3DError, F3DErrorKind, OutOfRange, Table},
    lights::{LightSet, Lights},
    pipeline::{PipelineState, TextureSettings},
    vertex::{Vertex, VertexWindow},
};

/// The externally visible state of an [Interpreter].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpreterState {
    /// The next step executes a command.
    Running,
    /// A call or branch was executed; the next step enters the target list.
    CallPending,
    /// The root display list has finished. Further steps do nothing.
    Ended,
    /// A command failed. Further steps return the same error.
    Faulted,
}

/// A fully resolved vertex of an emitted triangle.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct ShadedVertex {
    /// Model space position.
    pub pos: [i16; 3],
    #[allow(missing_docs)]
    pub flag: u16,
    /// Texture coordinates after scaling.
    pub uv: [i32; 2],
    /// Rgba shade color, either lit or taken from the vertex.
    pub shade: [u8; 4],
}

/// A triangle along with the pipeline state it was drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    #[allow(missing_docs)]
    pub vertices: [ShadedVertex; 3],
    #[allow(missing_docs)]
    pub flag: u8,
    #[allow(missing_docs)]
    pub state: PipelineState,
}

impl Triangle {
    /// The resolved vertices as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Receives triangles as they are emitted.
pub trait TriangleSink {
    /// Called once per triangle, in command order.
    fn emit(&mut self, triangle: Triangle);
}

impl TriangleSink for Vec<Triangle> {
    fn emit(&mut self, triangle: Triangle) {
        self.push(triangle);
    }
}

/// A [TriangleSink] that forwards to a closure. See [sink_fn].
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct SinkFn<F>(#[derivative(Debug = "ignore")] F);

impl<F: FnMut(Triangle)> TriangleSink for SinkFn<F> {
    fn emit(&mut self, triangle: Triangle) {
        (self.0)(triangle)
    }
}

/// Wraps a closure as a [TriangleSink].
pub fn sink_fn<F: FnMut(Triangle)>(f: F) -> SinkFn<F> {
    SinkFn(f)
}

/// Runs the display list `root` to completion.
pub fn interpret_display_list<S: TriangleSink + ?Sized>(
    asset: &Asset,
    root: DisplayListId,
    sink: &mut S,
) -> Result<(), F3DError> {
    Interpreter::new(asset, root).run(sink)
}

/// Looks up a display list by name and runs it to completion.
pub fn interpret_named_display_list<S: TriangleSink + ?Sized>(
    asset: &Asset,
    name: &str,
    sink: &mut S,
) -> Result<(), F3DError> {
    let root = asset
        .lookup(name)
        .ok_or_else(|| F3DErrorKind::malformed(format!("no display list named {:?}", name)))?;
    interpret_display_list(asset, root, sink)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    list: DisplayListId,
    index: usize,
}

#[derive(Debug, Clone)]
enum Status {
    Running,
    CallPending {
        target: DisplayListId,
        origin: CommandLocation,
    },
    Ended,
    Faulted(F3DError),
}

/// Executes display lists from an [Asset].
///
/// All working state (vertex window, pipeline state, light bindings and call stack)
/// belongs to the interpreter, so any number of interpreters can share one asset.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Interpreter<'a> {
    #[derivative(Debug = "ignore")]
    asset: &'a Asset,
    config: InterpreterConfig,
    root: DisplayListId,
    status: Status,
    frame: Frame,
    call_stack: Vec<Frame>,
    window: VertexWindow,
    pipeline: PipelineState,
    lights: LightSet,
    commands_executed: usize,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter positioned at the first command of `root`.
    pub fn new(asset: &'a Asset, root: DisplayListId) -> Self {
        Self::with_config(asset, root, InterpreterConfig::default())
    }

    #[allow(missing_docs)]
    pub fn with_config(asset: &'a Asset, root: DisplayListId, config: InterpreterConfig) -> Self {
        Self {
            asset,
            config,
            root,
            status: Status::Running,
            frame: Frame {
                list: root,
                index: 0,
            },
            call_stack: Vec::new(),
            window: VertexWindow::new(config.vertex_window_size),
            pipeline: PipelineState::default(),
            lights: LightSet::default(),
            commands_executed: 0,
        }
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> InterpreterState {
        match self.status {
            Status::Running => InterpreterState::Running,
            Status::CallPending { .. } => InterpreterState::CallPending,
            Status::Ended => InterpreterState::Ended,
            Status::Faulted(_) => InterpreterState::Faulted,
        }
    }

    /// The error that stopped the run, if any.
    pub fn fault(&self) -> Option<&F3DError> {
        match &self.status {
            Status::Faulted(error) => Some(error),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    #[allow(missing_docs)]
    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    #[allow(missing_docs)]
    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    #[allow(missing_docs)]
    pub fn window(&self) -> &VertexWindow {
        &self.window
    }

    /// Number of frames on the call stack.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    #[allow(missing_docs)]
    pub fn commands_executed(&self) -> usize {
        self.commands_executed
    }

    /// Location of the next command to execute.
    pub fn location(&self) -> CommandLocation {
        CommandLocation {
            list: self.frame.list,
            index: self.frame.index,
        }
    }

    /// Runs until the root display list ends or a command fails.
    pub fn run<S: TriangleSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), F3DError> {
        while self.step(sink)? != InterpreterState::Ended {}
        Ok(())
    }

    /// Executes a single command, or enters the target of a pending call.
    pub fn step<S: TriangleSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<InterpreterState, F3DError> {
        let result = match self.status {
            Status::Faulted(ref error) => return Err(error.clone()),
            Status::Ended => return Ok(InterpreterState::Ended),
            Status::CallPending { target, origin } => self.enter(target, origin),
            Status::Running => self.execute_next(sink),
        };
        match result {
            Ok(status) => {
                self.status = status;
                Ok(self.state())
            }
            Err(error) => {
                warn!("display list run faulted: {}", error);
                self.status = Status::Faulted(error.clone());
                Err(error)
            }
        }
    }

    fn enter(&mut self, target: DisplayListId, origin: CommandLocation) -> Result<Status, F3DError> {
        let list = self.asset.display_list(target).ok_or_else(|| {
            F3DError::at(
                origin,
                OutOfRange::new(
                    Table::DisplayList,
                    target.0 as usize,
                    self.asset.num_display_lists(),
                )
                .into(),
            )
        })?;
        debug!("entering display list {:?} ({})", list.name, target.0);
        self.frame = Frame {
            list: target,
            index: 0,
        };
        Ok(Status::Running)
    }

    fn execute_next<S: TriangleSink + ?Sized>(&mut self, sink: &mut S) -> Result<Status, F3DError> {
        let asset = self.asset;
        let location = self.location();

        let list = asset.display_list(self.frame.list).ok_or_else(|| {
            F3DError::at(
                location,
                OutOfRange::new(
                    Table::DisplayList,
                    self.frame.list.0 as usize,
                    asset.num_display_lists(),
                )
                .into(),
            )
        })?;
        let raw = *list.commands.get(self.frame.index).ok_or_else(|| {
            F3DError::at(
                location,
                OutOfRange::new(Table::Commands, self.frame.index, list.commands.len()).into(),
            )
        })?;

        if let Some(limit) = self.config.command_limit {
            if self.commands_executed >= limit {
                return Err(F3DError::at(
                    location,
                    F3DErrorKind::CommandLimitExceeded(limit),
                ));
            }
        }
        self.commands_executed += 1;

        let cmd = decode_f3d_command(raw).map_err(|kind| F3DError::at(location, kind))?;
        trace!("{}: {:?}", location, cmd);
        self.execute(cmd, location, sink)
            .map_err(|kind| F3DError::at(location, kind))
    }

    fn execute<S: TriangleSink + ?Sized>(
        &mut self,
        cmd: F3DCommand,
        location: CommandLocation,
        sink: &mut S,
    ) -> Result<Status, F3DErrorKind> {
        use F3DCommand::*;

        match cmd {
            NoOp | DPFullSync | DPTileSync | DPLoadSync => {}
            DPPipeSync => self.pipeline.pipe_sync(),
            SPVertex { v, n, v0 } => {
                self.window.load(
                    self.asset.vertices(),
                    v as usize,
                    n as usize,
                    v0 as usize,
                )?;
            }
            SPOneTriangle { v0, v1, v2, flag } => {
                let triangle = self.triangle([v0, v1, v2], flag)?;
                sink.emit(triangle);
            }
            SPTwoTriangles { first, second } => {
                let first = self.triangle(first, 0)?;
                let second = self.triangle(second, 0)?;
                sink.emit(first);
                sink.emit(second);
            }
            SPDisplayList(target) => {
                if self.call_stack.len() >= self.config.max_call_depth {
                    return Err(F3DErrorKind::StackOverflow(self.config.max_call_depth));
                }
                debug!("{}: call display list {}", location, target.0);
                self.call_stack.push(Frame {
                    list: self.frame.list,
                    index: self.frame.index + 1,
                });
                return Ok(Status::CallPending {
                    target,
                    origin: location,
                });
            }
            SPBranchList(target) => {
                debug!("{}: branch to display list {}", location, target.0);
                return Ok(Status::CallPending {
                    target,
                    origin: location,
                });
            }
            SPEndDisplayList => return Ok(self.end_display_list(location)),
            SPReturn => return self.return_from_display_list(location),
            SPSetLights { lights, .. } => {
                let record = self.lights_record(lights)?;
                self.lights.set_lights(record)?;
            }
            SPLight { light, n } => {
                let record = self.lights_record(light.record)?;
                self.lights.bind(record, light, n)?;
            }
            SPNumLights(n) => self.lights.set_num_lights(n)?,
            SPTexture {
                sc,
                tc,
                level,
                tile,
                on,
            } => self.pipeline.set_texture(TextureSettings {
                scale: [sc, tc],
                level,
                tile,
                on,
            }),
            SPSetGeometryMode(mode) => self.pipeline.set_geometry_mode(mode),
            SPClearGeometryMode(mode) => self.pipeline.clear_geometry_mode(mode),
            DPSetCombineMode(mode) => self.pipeline.set_combine(mode),
            DPSetEnvColor(color) => self.pipeline.set_env_color(color),
            DPSetPrimColor(color) => self.pipeline.set_prim_color(color),
        }

        self.frame.index += 1;
        Ok(Status::Running)
    }

    fn end_display_list(&mut self, location: CommandLocation) -> Status {
        match self.call_stack.pop() {
            Some(frame) => {
                debug!("{}: end of called display list", location);
                self.frame = frame;
                Status::Running
            }
            None => {
                debug!(
                    "{}: display list run ended after {} commands",
                    location, self.commands_executed
                );
                Status::Ended
            }
        }
    }

    fn return_from_display_list(&mut self, location: CommandLocation) -> Result<Status, F3DErrorKind> {
        match self.call_stack.pop() {
            Some(frame) => {
                debug!("{}: return", location);
                self.frame = frame;
                Ok(Status::Running)
            }
            None if self.frame.list == self.root => {
                debug!(
                    "{}: display list run ended after {} commands",
                    location, self.commands_executed
                );
                Ok(Status::Ended)
            }
            None => Err(F3DErrorKind::StackUnderflow),
        }
    }

    fn lights_record(&self, record: u32) -> Result<&'a Lights, F3DErrorKind> {
        let asset = self.asset;
        asset.lights(record).ok_or_else(|| {
            OutOfRange::new(
                Table::LightTable,
                record as usize,
                asset.num_lights_records(),
            )
            .into()
        })
    }

    fn triangle(&self, indices: [u32; 3], flag: u32) -> Result<Triangle, F3DErrorKind> {
        let mut vertices = [ShadedVertex::default(); 3];
        for (out, &index) in vertices.iter_mut().zip(&indices) {
            *out = self.shade_vertex(&self.window.get(index)?);
        }
        Ok(Triangle {
            vertices,
            flag: flag as u8,
            state: self.pipeline,
        })
    }

    fn shade_vertex(&self, vtx: &Vertex) -> ShadedVertex {
        let shade = if self.pipeline.lighting() {
            Rgba32::from_rgb_a(self.lights.shade(vtx.normal()), vtx.color().a)
        } else {
            vtx.color()
        };
        ShadedVertex {
            pos: vtx.pos,
            flag: vtx.flag,
            uv: self.pipeline.texture_coords(vtx),
            shade: shade.to_array(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Once, thread};

    use super::*;
    use crate::{
        cmd::{GeometryModes, Rgba32},
        decode::RawF3DCommand,
        gbi::*,
        lights::Light,
        sample::{cube, CUBE_ROOT},
        vertex::MAX_WINDOW_SIZE,
    };

    static INIT_LOGGER: Once = Once::new();

    fn init_logger() {
        INIT_LOGGER.call_once(|| {
            let _ = env_logger::builder().is_test(true).try_init();
        });
    }

    fn run_cube() -> Vec<Triangle> {
        init_logger();
        let asset = cube().unwrap();
        let mut triangles: Vec<Triangle> = Vec::new();
        interpret_named_display_list(&asset, CUBE_ROOT, &mut triangles).unwrap();
        triangles
    }

    fn one_vertex() -> Vertex {
        Vertex::new([1, 2, 3], 0, [32, 64], [0, 0, 127, 200])
    }

    #[test]
    fn test_cube_emits_twelve_triangles() {
        let triangles = run_cube();
        assert_eq!(triangles.len(), 12);

        // First quad of the second load uses table entries 16..=18.
        assert_eq!(triangles[8].vertices[0].pos, [-50, -50, -50]);
        assert_eq!(triangles[8].vertices[1].pos, [50, -50, -50]);
        assert_eq!(triangles[8].vertices[2].pos, [50, -50, 50]);
    }

    #[test]
    fn test_cube_triangles_are_unlit() {
        let triangles = run_cube();
        for triangle in &triangles {
            assert!(!triangle.state.geometry_mode.contains(GeometryModes::LIGHTING));
            assert!(triangle.state.texture.on);
        }
        assert_eq!(triangles[0].vertices[0].shade, [129, 0, 0, 255]);
        assert_eq!(triangles[0].vertices[0].uv, [367, 1007]);
    }

    #[test]
    fn test_cube_reaches_end_with_lighting_set() {
        init_logger();
        let asset = cube().unwrap();
        let root = asset.lookup(CUBE_ROOT).unwrap();
        let mut interpreter = Interpreter::new(&asset, root);
        let mut triangles: Vec<Triangle> = Vec::new();

        let mut states = Vec::new();
        loop {
            let state = interpreter.step(&mut triangles).unwrap();
            states.push(state);
            if state == InterpreterState::Ended {
                break;
            }
        }
        assert!(states.contains(&InterpreterState::CallPending));
        assert_eq!(interpreter.call_depth(), 0);
        assert!(interpreter.pipeline().lighting());
        assert!(!interpreter.pipeline().texture.on);
        assert_eq!(interpreter.lights().num_dir_lights(), 1);
        assert_eq!(interpreter.lights().ambient(), [0x7F; 3]);

        assert_eq!(interpreter.step(&mut triangles), Ok(InterpreterState::Ended));
        assert_eq!(triangles.len(), 12);
    }

    #[test]
    fn test_reruns_are_identical() {
        let first = run_cube();
        let second = run_cube();
        assert_eq!(first, second);
        let first_bytes: Vec<u8> = first.iter().flat_map(|t| t.vertex_bytes().to_vec()).collect();
        let second_bytes: Vec<u8> = second
            .iter()
            .flat_map(|t| t.vertex_bytes().to_vec())
            .collect();
        assert_eq!(first_bytes.len(), 12 * 3 * 20);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_unloaded_index_is_out_of_range() {
        let mut builder = Asset::builder();
        let vtx = builder.vertices(&[one_vertex(); 8]);
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_vertex(vtx, 8, 0),
                gs_sp1_triangle(0, 1, 16, 0),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpret_display_list(&asset, root, &mut triangles).unwrap_err();
        assert_eq!(
            error,
            F3DError::at(
                CommandLocation {
                    list: root,
                    index: 1
                },
                OutOfRange::new(Table::VertexWindow, 16, 8).into()
            )
        );
        assert!(triangles.is_empty());
    }

    #[test]
    fn test_two_triangles_resolve_before_emitting() {
        let mut builder = Asset::builder();
        let vtx = builder.vertices(&[one_vertex(); 4]);
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_vertex(vtx, 4, 0),
                gs_sp2_triangles(0, 1, 2, 0, 1, 2, 3, 0),
                gs_sp2_triangles(0, 1, 2, 0, 1, 2, 4, 0),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpret_display_list(&asset, root, &mut triangles).unwrap_err();
        assert_eq!(error.location.map(|l| l.index), Some(2));
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn test_state_persists_across_return() {
        let mut builder = Asset::builder();
        let vtx = builder.vertices(&[one_vertex(); 3]);
        let callee = builder.display_list(
            "callee",
            vec![
                gs_dp_set_env_color(Rgba32::from(0x11223344)),
                gs_sp_set_geometry_mode(GeometryModes::CULL_BACK),
                gs_sp_return(),
            ],
        );
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_vertex(vtx, 3, 0),
                gs_sp_display_list(callee),
                gs_sp1_triangle(0, 1, 2, 0),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut interpreter = Interpreter::new(&asset, root);
        let mut triangles: Vec<Triangle> = Vec::new();
        interpreter.run(&mut triangles).unwrap();

        assert_eq!(triangles.len(), 1);
        let state = triangles[0].state;
        assert_eq!(state.env_color, Rgba32::from(0x11223344));
        assert_eq!(state.geometry_mode, GeometryModes::CULL_BACK);
        assert_eq!(interpreter.window().loaded_count(), 3);
        assert_eq!(interpreter.state(), InterpreterState::Ended);
    }

    #[test]
    fn test_call_depth_overflow() {
        let mut builder = Asset::builder();
        let recurse = builder.declare("recurse");
        builder.define(
            recurse,
            vec![gs_sp_display_list(recurse), gs_sp_end_display_list()],
        );
        let asset = builder.build().unwrap();

        let config = InterpreterConfig {
            max_call_depth: 3,
            ..Default::default()
        };
        let mut interpreter = Interpreter::with_config(&asset, recurse, config);
        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpreter.run(&mut triangles).unwrap_err();
        assert_eq!(error.kind, F3DErrorKind::StackOverflow(3));
        assert_eq!(interpreter.call_depth(), 3);
        assert_eq!(interpreter.state(), InterpreterState::Faulted);
    }

    #[test]
    fn test_return_without_caller_underflows() {
        let mut builder = Asset::builder();
        let target = builder.display_list("target", vec![gs_sp_return()]);
        let root = builder.display_list("root", vec![gs_sp_branch_list(target)]);
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpret_display_list(&asset, root, &mut triangles).unwrap_err();
        assert_eq!(
            error,
            F3DError::at(
                CommandLocation {
                    list: target,
                    index: 0
                },
                F3DErrorKind::StackUnderflow
            )
        );
    }

    #[test]
    fn test_return_from_root_ends() {
        let mut builder = Asset::builder();
        let root = builder.display_list("root", vec![gs_dp_pipe_sync(), gs_sp_return()]);
        let asset = builder.build().unwrap();

        let mut interpreter = Interpreter::new(&asset, root);
        interpreter.run(&mut Vec::<Triangle>::new()).unwrap();
        assert_eq!(interpreter.state(), InterpreterState::Ended);
        assert_eq!(interpreter.commands_executed(), 2);
    }

    #[test]
    fn test_unknown_opcode_is_located() {
        let mut builder = Asset::builder();
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_no_op(),
                RawF3DCommand::new(0xAB00_0000, 0x1234),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut interpreter = Interpreter::new(&asset, root);
        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpreter.run(&mut triangles).unwrap_err();
        let expected = F3DError::at(
            CommandLocation {
                list: root,
                index: 1,
            },
            F3DErrorKind::UnknownOpcode([0xAB00_0000, 0x1234]),
        );
        assert_eq!(error, expected);

        // Faulted is terminal.
        assert_eq!(interpreter.step(&mut triangles), Err(expected.clone()));
        assert_eq!(interpreter.fault(), Some(&expected));
    }

    #[test]
    fn test_branch_loop_hits_command_limit() {
        let mut builder = Asset::builder();
        let spin = builder.declare("spin");
        builder.define(spin, vec![gs_dp_pipe_sync(), gs_sp_branch_list(spin)]);
        let asset = builder.build().unwrap();

        let config = InterpreterConfig {
            command_limit: Some(100),
            ..Default::default()
        };
        let mut interpreter = Interpreter::with_config(&asset, spin, config);
        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpreter.run(&mut triangles).unwrap_err();
        assert_eq!(error.kind, F3DErrorKind::CommandLimitExceeded(100));
        assert_eq!(interpreter.commands_executed(), 100);
    }

    #[test]
    fn test_call_to_missing_list() {
        let mut builder = Asset::builder();
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_display_list(DisplayListId(7)),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut interpreter = Interpreter::new(&asset, root);
        let mut triangles: Vec<Triangle> = Vec::new();
        assert_eq!(
            interpreter.step(&mut triangles),
            Ok(InterpreterState::CallPending)
        );
        let error = interpreter.step(&mut triangles).unwrap_err();
        assert_eq!(
            error,
            F3DError::at(
                CommandLocation {
                    list: root,
                    index: 0
                },
                OutOfRange::new(Table::DisplayList, 7, 1).into()
            )
        );
    }

    #[test]
    fn test_lit_shading() {
        let mut builder = Asset::builder();
        let vtx = builder.vertices(&[
            Vertex::new([0, 0, 0], 0, [0, 0], [0, 0, 127, 10]),
            Vertex::new([0, 0, 0], 0, [0, 0], [0, 0, 129, 20]),
            Vertex::new([0, 0, 0], 0, [0, 0], [127, 0, 0, 30]),
        ]);
        let lights = builder.lights(Lights::lights1([0x20; 3], [0x40; 3], [0, 0, 127]));
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_set_lights(lights, 1),
                gs_sp_set_geometry_mode(GeometryModes::LIGHTING),
                gs_sp_vertex(vtx, 3, 0),
                gs_sp1_triangle(0, 1, 2, 0),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        interpret_display_list(&asset, root, &mut triangles).unwrap();
        let shades: Vec<[u8; 4]> = triangles[0].vertices.iter().map(|v| v.shade).collect();
        assert_eq!(
            shades,
            vec![
                [0x60, 0x60, 0x60, 10],
                [0x20, 0x20, 0x20, 20],
                [0x20, 0x20, 0x20, 30]
            ]
        );
    }

    #[test]
    fn test_single_light_binding() {
        let mut builder = Asset::builder();
        let vtx = builder.vertices(&[one_vertex(); 3]);
        let lights = builder.lights(Lights::new(
            [0x10; 3],
            vec![
                Light::new([0x80; 3], [127, 0, 0]),
                Light::new([0x40; 3], [0, 0, 127]),
            ],
        ));
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_light(lights, 1, 1),
                gs_sp_light(lights, 2, 2),
                gs_sp_num_lights(1),
                gs_sp_set_geometry_mode(GeometryModes::LIGHTING),
                gs_sp_vertex(vtx, 3, 0),
                gs_sp1_triangle(0, 1, 2, 0),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        interpret_display_list(&asset, root, &mut triangles).unwrap();
        assert_eq!(triangles[0].vertices[0].shade, [0x50, 0x50, 0x50, 200]);
    }

    #[test]
    fn test_num_lights_beyond_bound_slots_faults() {
        let mut builder = Asset::builder();
        let vtx = builder.vertices(&[one_vertex(); 3]);
        let lights = builder.lights(Lights::lights1([0x20; 3], [0x40; 3], [0, 0, 127]));
        let root = builder.display_list(
            "root",
            vec![
                gs_sp_set_lights(lights, 1),
                gs_sp_num_lights(3),
                gs_sp_set_geometry_mode(GeometryModes::LIGHTING),
                gs_sp_vertex(vtx, 3, 0),
                gs_sp1_triangle(0, 1, 2, 0),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut interpreter = Interpreter::new(&asset, root);
        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpreter.run(&mut triangles).unwrap_err();
        assert_eq!(
            error,
            F3DError::at(
                CommandLocation {
                    list: root,
                    index: 1
                },
                OutOfRange::new(Table::LightSlot, 2, 2).into()
            )
        );
        assert!(triangles.is_empty());
        assert_eq!(interpreter.lights().ambient(), [0x20; 3]);
    }

    #[test]
    fn test_set_lights_missing_record() {
        let mut builder = Asset::builder();
        builder.lights(Lights::lights1([0x20; 3], [0x40; 3], [0, 0, 127]));
        let root = builder.display_list(
            "root",
            vec![gs_sp_set_lights(3, 1), gs_sp_end_display_list()],
        );
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpret_display_list(&asset, root, &mut triangles).unwrap_err();
        assert_eq!(
            error.kind,
            OutOfRange::new(Table::LightTable, 3, 1).into()
        );
        assert_eq!(error.location.map(|l| l.index), Some(0));
    }

    #[test]
    fn test_single_light_missing_record() {
        let mut builder = Asset::builder();
        let root = builder.display_list(
            "root",
            vec![
                gs_dp_pipe_sync(),
                gs_sp_light(0, 0, 1),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpret_display_list(&asset, root, &mut triangles).unwrap_err();
        assert_eq!(
            error,
            F3DError::at(
                CommandLocation {
                    list: root,
                    index: 1
                },
                OutOfRange::new(Table::LightTable, 0, 0).into()
            )
        );
    }

    #[test]
    fn test_prim_and_env_colors_reach_triangles() {
        let mut builder = Asset::builder();
        let vtx = builder.vertices(&[one_vertex(); 3]);
        let root = builder.display_list(
            "root",
            vec![
                gs_dp_set_prim_color(Rgba32::from(0xAABBCCDD)),
                gs_dp_set_env_color(Rgba32::from(0x01020304)),
                gs_sp_vertex(vtx, 3, 0),
                gs_sp1_triangle(0, 1, 2, 0),
                gs_dp_set_prim_color(Rgba32::from(0xFF)),
                gs_sp1_triangle(2, 1, 0, 0),
                gs_sp_end_display_list(),
            ],
        );
        let asset = builder.build().unwrap();

        let mut triangles: Vec<Triangle> = Vec::new();
        interpret_display_list(&asset, root, &mut triangles).unwrap();
        assert_eq!(triangles[0].state.prim_color, Rgba32::from(0xAABBCCDD));
        assert_eq!(triangles[0].state.env_color, Rgba32::from(0x01020304));
        assert_eq!(triangles[1].state.prim_color, Rgba32::from(0xFF));
        assert_eq!(triangles[1].state.env_color, Rgba32::from(0x01020304));
    }

    #[test]
    fn test_oversized_config_limits() {
        let config: InterpreterConfig = serde_json::from_str(
            r#"{"max_call_depth": 18446744073709551615, "vertex_window_size": 18446744073709551615}"#,
        )
        .unwrap();
        let asset = cube().unwrap();
        let root = asset.lookup(CUBE_ROOT).unwrap();

        let mut interpreter = Interpreter::with_config(&asset, root, config);
        assert_eq!(interpreter.window().capacity(), MAX_WINDOW_SIZE);
        let mut triangles: Vec<Triangle> = Vec::new();
        interpreter.run(&mut triangles).unwrap();
        assert_eq!(triangles.len(), 12);
    }

    #[test]
    fn test_sink_fn() {
        let asset = cube().unwrap();
        let mut count = 0;
        let mut sink = sink_fn(|_| count += 1);
        interpret_named_display_list(&asset, CUBE_ROOT, &mut sink).unwrap();
        drop(sink);
        assert_eq!(count, 12);
    }

    #[test]
    fn test_missing_root_name() {
        let asset = cube().unwrap();
        let mut triangles: Vec<Triangle> = Vec::new();
        let error = interpret_named_display_list(&asset, "nope", &mut triangles).unwrap_err();
        assert!(triangles.is_empty());
        assert!(matches!(error.kind, F3DErrorKind::MalformedAsset(_)));
    }

    #[test]
    fn test_shared_asset_across_threads() {
        let asset = cube().unwrap();
        let root = asset.lookup(CUBE_ROOT).unwrap();
        let expected = run_cube();

        thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        let mut triangles: Vec<Triangle> = Vec::new();
                        interpret_display_list(&asset, root, &mut triangles).unwrap();
                        triangles
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
