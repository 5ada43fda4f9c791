//! A [`PaintContext`] that records calls instead of drawing

use std::fmt;

use recompose_wire::operations::{PaintBundle, ShaderData};
use recompose_wire::{PaintContext, PaintError, PaintResult, TextRun};

/// One backend call with its resolved arguments
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCall {
    MatrixSave,
    MatrixRestore,
    MatrixScale(f32, f32, f32, f32),
    MatrixTranslate(f32, f32),
    MatrixSkew(f32, f32),
    MatrixRotate(f32, f32, f32),
    ClipRect(f32, f32, f32, f32),
    ClipPath { path_id: i32, region_op: i32 },
    ApplyPaint(PaintBundle),
    LoadPath { path_id: i32, data: Vec<f32> },
    LoadBitmap { bitmap_id: i32, width: u32, height: u32, bytes: usize },
    LoadShader { shader_id: i32, source: String },
    DrawArc(f32, f32, f32, f32, f32, f32),
    DrawCircle(f32, f32, f32),
    DrawLine(f32, f32, f32, f32),
    DrawOval(f32, f32, f32, f32),
    DrawRect(f32, f32, f32, f32),
    DrawRoundRect(f32, f32, f32, f32, f32, f32),
    DrawPath { path_id: i32, start: f32, end: f32 },
    DrawTweenPath { path1_id: i32, path2_id: i32, tween: f32, start: f32, stop: f32 },
    DrawTextRun { text: String, x: f32, y: f32, rtl: bool },
    DrawTextAnchored { text: String, x: f32, y: f32, pan_x: f32, pan_y: f32, flags: u32 },
    DrawTextOnPath { text: String, path_id: i32, h_offset: f32, v_offset: f32 },
    DrawBitmap { bitmap_id: i32, rect: [f32; 4] },
    DrawBitmapInt { bitmap_id: i32, src: [i32; 4], dst: [i32; 4] },
}

impl PaintCall {
    /// Backend method name
    pub fn name(&self) -> &'static str {
        match self {
            PaintCall::MatrixSave => "matrix_save",
            PaintCall::MatrixRestore => "matrix_restore",
            PaintCall::MatrixScale(..) => "matrix_scale",
            PaintCall::MatrixTranslate(..) => "matrix_translate",
            PaintCall::MatrixSkew(..) => "matrix_skew",
            PaintCall::MatrixRotate(..) => "matrix_rotate",
            PaintCall::ClipRect(..) => "clip_rect",
            PaintCall::ClipPath { .. } => "clip_path",
            PaintCall::ApplyPaint(_) => "apply_paint",
            PaintCall::LoadPath { .. } => "load_path",
            PaintCall::LoadBitmap { .. } => "load_bitmap",
            PaintCall::LoadShader { .. } => "load_shader",
            PaintCall::DrawArc(..) => "draw_arc",
            PaintCall::DrawCircle(..) => "draw_circle",
            PaintCall::DrawLine(..) => "draw_line",
            PaintCall::DrawOval(..) => "draw_oval",
            PaintCall::DrawRect(..) => "draw_rect",
            PaintCall::DrawRoundRect(..) => "draw_round_rect",
            PaintCall::DrawPath { .. } => "draw_path",
            PaintCall::DrawTweenPath { .. } => "draw_tween_path",
            PaintCall::DrawTextRun { .. } => "draw_text_run",
            PaintCall::DrawTextAnchored { .. } => "draw_text_anchored",
            PaintCall::DrawTextOnPath { .. } => "draw_text_on_path",
            PaintCall::DrawBitmap { .. } => "draw_bitmap",
            PaintCall::DrawBitmapInt { .. } => "draw_bitmap_int",
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, name: &str, args: &[f32]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

impl fmt::Display for PaintCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            PaintCall::MatrixSave | PaintCall::MatrixRestore => write!(f, "{name}()"),
            PaintCall::MatrixScale(a, b, c, d)
            | PaintCall::ClipRect(a, b, c, d)
            | PaintCall::DrawLine(a, b, c, d)
            | PaintCall::DrawOval(a, b, c, d)
            | PaintCall::DrawRect(a, b, c, d) => write_args(f, name, &[*a, *b, *c, *d]),
            PaintCall::MatrixTranslate(a, b) | PaintCall::MatrixSkew(a, b) => {
                write_args(f, name, &[*a, *b])
            }
            PaintCall::MatrixRotate(a, b, c) | PaintCall::DrawCircle(a, b, c) => {
                write_args(f, name, &[*a, *b, *c])
            }
            PaintCall::DrawArc(a, b, c, d, e, g) | PaintCall::DrawRoundRect(a, b, c, d, e, g) => {
                write_args(f, name, &[*a, *b, *c, *d, *e, *g])
            }
            PaintCall::ClipPath { path_id, region_op } => write!(f, "{name}({path_id}, {region_op})"),
            PaintCall::ApplyPaint(bundle) => write!(f, "{name}({bundle})"),
            PaintCall::LoadPath { path_id, data } => {
                write!(f, "{name}({path_id}, {} floats)", data.len())
            }
            PaintCall::LoadBitmap {
                bitmap_id,
                width,
                height,
                bytes,
            } => write!(f, "{name}({bitmap_id}, {width}x{height}, {bytes} bytes)"),
            PaintCall::LoadShader { shader_id, source } => {
                write!(f, "{name}({shader_id}, {} chars)", source.chars().count())
            }
            PaintCall::DrawPath {
                path_id,
                start,
                end,
            } => write!(f, "{name}({path_id}, {start}, {end})"),
            PaintCall::DrawTweenPath {
                path1_id,
                path2_id,
                tween,
                start,
                stop,
            } => write!(f, "{name}({path1_id}, {path2_id}, {tween}, {start}, {stop})"),
            PaintCall::DrawTextRun { text, x, y, rtl } => {
                write!(f, "{name}({text:?}, {x}, {y}")?;
                if *rtl {
                    f.write_str(", rtl")?;
                }
                f.write_str(")")
            }
            PaintCall::DrawTextAnchored {
                text,
                x,
                y,
                pan_x,
                pan_y,
                flags,
            } => write!(f, "{name}({text:?}, {x}, {y}, {pan_x}, {pan_y}, {flags:#x})"),
            PaintCall::DrawTextOnPath {
                text,
                path_id,
                h_offset,
                v_offset,
            } => write!(f, "{name}({text:?}, {path_id}, {h_offset}, {v_offset})"),
            PaintCall::DrawBitmap { bitmap_id, rect } => {
                let [l, t, r, b] = rect;
                write!(f, "{name}({bitmap_id}, {l}, {t}, {r}, {b})")
            }
            PaintCall::DrawBitmapInt {
                bitmap_id,
                src,
                dst,
            } => write!(f, "{name}({bitmap_id}, {src:?}, {dst:?})"),
        }
    }
}

/// Records every call it receives
///
/// Failures can be injected by call name or by call position, and a
/// `matrix_restore` without a matching save fails like a real canvas would.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    calls: Vec<PaintCall>,
    failures: Vec<PaintError>,
    fail_names: Vec<&'static str>,
    fail_positions: Vec<usize>,
    attempts: usize,
    save_depth: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call to the named backend method
    pub fn fail_on(mut self, call: &'static str) -> Self {
        self.fail_names.push(call);
        self
    }

    /// Fail the call at this zero-based position, counting every attempt
    pub fn fail_at(mut self, position: usize) -> Self {
        self.fail_positions.push(position);
        self
    }

    /// Successful calls in the order received
    pub fn calls(&self) -> &[PaintCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<PaintCall> {
        std::mem::take(&mut self.calls)
    }

    /// Errors returned to the caller, in order
    pub fn failures(&self) -> &[PaintError] {
        &self.failures
    }

    pub fn save_depth(&self) -> usize {
        self.save_depth
    }

    fn record(&mut self, call: PaintCall) -> PaintResult {
        let position = self.attempts;
        self.attempts += 1;
        let name = call.name();
        let error = if self.fail_names.contains(&name) || self.fail_positions.contains(&position) {
            Some(PaintError::new(name, "injected failure"))
        } else {
            self.track_save_depth(&call).err()
        };
        match error {
            Some(error) => {
                self.failures.push(error.clone());
                Err(error)
            }
            None => {
                self.calls.push(call);
                Ok(())
            }
        }
    }

    fn track_save_depth(&mut self, call: &PaintCall) -> PaintResult {
        match call {
            PaintCall::MatrixSave => self.save_depth += 1,
            PaintCall::MatrixRestore => {
                self.save_depth = self
                    .save_depth
                    .checked_sub(1)
                    .ok_or_else(|| PaintError::new(call.name(), "restore without matching save"))?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl PaintContext for RecordingCanvas {
    fn matrix_save(&mut self) -> PaintResult {
        self.record(PaintCall::MatrixSave)
    }

    fn matrix_restore(&mut self) -> PaintResult {
        self.record(PaintCall::MatrixRestore)
    }

    fn matrix_scale(&mut self, scale_x: f32, scale_y: f32, center_x: f32, center_y: f32) -> PaintResult {
        self.record(PaintCall::MatrixScale(scale_x, scale_y, center_x, center_y))
    }

    fn matrix_translate(&mut self, dx: f32, dy: f32) -> PaintResult {
        self.record(PaintCall::MatrixTranslate(dx, dy))
    }

    fn matrix_skew(&mut self, skew_x: f32, skew_y: f32) -> PaintResult {
        self.record(PaintCall::MatrixSkew(skew_x, skew_y))
    }

    fn matrix_rotate(&mut self, degrees: f32, center_x: f32, center_y: f32) -> PaintResult {
        self.record(PaintCall::MatrixRotate(degrees, center_x, center_y))
    }

    fn clip_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> PaintResult {
        self.record(PaintCall::ClipRect(left, top, right, bottom))
    }

    fn clip_path(&mut self, path_id: i32, region_op: i32) -> PaintResult {
        self.record(PaintCall::ClipPath { path_id, region_op })
    }

    fn apply_paint(&mut self, paint: &PaintBundle) -> PaintResult {
        self.record(PaintCall::ApplyPaint(paint.clone()))
    }

    fn load_path(&mut self, path_id: i32, data: &[f32]) -> PaintResult {
        self.record(PaintCall::LoadPath {
            path_id,
            data: data.to_vec(),
        })
    }

    fn load_bitmap(&mut self, bitmap_id: i32, width: u32, height: u32, pixels: &[u8]) -> PaintResult {
        self.record(PaintCall::LoadBitmap {
            bitmap_id,
            width,
            height,
            bytes: pixels.len(),
        })
    }

    fn load_shader(&mut self, shader: &ShaderData) -> PaintResult {
        self.record(PaintCall::LoadShader {
            shader_id: shader.id,
            source: shader.source.get().to_owned(),
        })
    }

    fn draw_arc(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        start_angle: f32,
        sweep_angle: f32,
    ) -> PaintResult {
        self.record(PaintCall::DrawArc(left, top, right, bottom, start_angle, sweep_angle))
    }

    fn draw_circle(&mut self, center_x: f32, center_y: f32, radius: f32) -> PaintResult {
        self.record(PaintCall::DrawCircle(center_x, center_y, radius))
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> PaintResult {
        self.record(PaintCall::DrawLine(x1, y1, x2, y2))
    }

    fn draw_oval(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> PaintResult {
        self.record(PaintCall::DrawOval(left, top, right, bottom))
    }

    fn draw_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> PaintResult {
        self.record(PaintCall::DrawRect(left, top, right, bottom))
    }

    fn draw_round_rect(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        radius_x: f32,
        radius_y: f32,
    ) -> PaintResult {
        self.record(PaintCall::DrawRoundRect(left, top, right, bottom, radius_x, radius_y))
    }

    fn draw_path(&mut self, path_id: i32, start: f32, end: f32) -> PaintResult {
        self.record(PaintCall::DrawPath {
            path_id,
            start,
            end,
        })
    }

    fn draw_tween_path(
        &mut self,
        path1_id: i32,
        path2_id: i32,
        tween: f32,
        start: f32,
        stop: f32,
    ) -> PaintResult {
        self.record(PaintCall::DrawTweenPath {
            path1_id,
            path2_id,
            tween,
            start,
            stop,
        })
    }

    fn draw_text_run(&mut self, run: TextRun<'_>) -> PaintResult {
        let text = match (usize::try_from(run.start), usize::try_from(run.end)) {
            (Ok(start), Ok(end)) => run.text.get(start..end.min(run.text.len())).unwrap_or(""),
            (Ok(start), Err(_)) => run.text.get(start..).unwrap_or(""),
            _ => run.text,
        };
        self.record(PaintCall::DrawTextRun {
            text: text.to_owned(),
            x: run.x,
            y: run.y,
            rtl: run.rtl,
        })
    }

    fn draw_text_anchored(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        pan_x: f32,
        pan_y: f32,
        flags: u32,
    ) -> PaintResult {
        self.record(PaintCall::DrawTextAnchored {
            text: text.to_owned(),
            x,
            y,
            pan_x,
            pan_y,
            flags,
        })
    }

    fn draw_text_on_path(
        &mut self,
        text: &str,
        path_id: i32,
        h_offset: f32,
        v_offset: f32,
    ) -> PaintResult {
        self.record(PaintCall::DrawTextOnPath {
            text: text.to_owned(),
            path_id,
            h_offset,
            v_offset,
        })
    }

    fn draw_bitmap(
        &mut self,
        bitmap_id: i32,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        _content_description: i32,
    ) -> PaintResult {
        self.record(PaintCall::DrawBitmap {
            bitmap_id,
            rect: [left, top, right, bottom],
        })
    }

    fn draw_bitmap_int(
        &mut self,
        bitmap_id: i32,
        src: [i32; 4],
        dst: [i32; 4],
        _content_description: i32,
    ) -> PaintResult {
        self.record(PaintCall::DrawBitmapInt {
            bitmap_id,
            src,
            dst,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, start: i32, end: i32) -> TextRun<'_> {
        TextRun {
            text,
            start,
            end,
            context_start: 0,
            context_end: -1,
            x: 0.0,
            y: 0.0,
            rtl: false,
        }
    }

    #[test]
    fn test_records_in_order() {
        let mut canvas = RecordingCanvas::new();
        canvas.matrix_save().unwrap();
        canvas.draw_circle(10.0, 20.0, 5.0).unwrap();
        canvas.matrix_restore().unwrap();
        assert_eq!(
            canvas.calls(),
            &[
                PaintCall::MatrixSave,
                PaintCall::DrawCircle(10.0, 20.0, 5.0),
                PaintCall::MatrixRestore
            ]
        );
        assert_eq!(canvas.calls()[1].to_string(), "draw_circle(10, 20, 5)");
    }

    #[test]
    fn test_restore_without_save_fails() {
        let mut canvas = RecordingCanvas::new();
        let err = canvas.matrix_restore().unwrap_err();
        assert_eq!(err.call, "matrix_restore");
        assert!(canvas.calls().is_empty());
        assert_eq!(canvas.failures().len(), 1);
    }

    #[test]
    fn test_injected_failures() {
        let mut canvas = RecordingCanvas::new().fail_on("draw_line").fail_at(0);
        assert!(canvas.draw_rect(0.0, 0.0, 1.0, 1.0).is_err());
        assert!(canvas.draw_rect(0.0, 0.0, 1.0, 1.0).is_ok());
        assert!(canvas.draw_line(0.0, 0.0, 1.0, 1.0).is_err());
        assert_eq!(canvas.calls().len(), 1);
    }

    #[test]
    fn test_text_run_range() {
        let mut canvas = RecordingCanvas::new();
        canvas.draw_text_run(run("hello", 0, -1)).unwrap();
        canvas.draw_text_run(run("hello", 1, 3)).unwrap();
        canvas.draw_text_run(run("hello", 2, 99)).unwrap();
        let texts: Vec<String> = canvas
            .calls()
            .iter()
            .map(|call| match call {
                PaintCall::DrawTextRun { text, .. } => text.clone(),
                other => panic!("unexpected {other}"),
            })
            .collect();
        assert_eq!(texts, ["hello", "el", "llo"]);
    }
}
