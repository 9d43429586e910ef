use std::fs;

use easel::{BlendMode, Canvas, CanvasOptions, Color, StyleConfig, ToolKind};
use tempfile::TempDir;

fn small_canvas() -> Canvas {
    Canvas::new(
        CanvasOptions {
            width: 64,
            height: 48,
        },
        StyleConfig::default(),
    )
}

/// Paints one brush stroke and one line, each as a committed stroke.
fn paint_some_strokes(canvas: &mut Canvas) {
    canvas.set_foreground(Color::rgb(200, 40, 40));
    canvas.touch_start(10.0, 10.0, -1, 1.0);
    canvas.touch_move(30.0, 12.0, -1, 0.7);
    canvas.touch_move(50.0, 10.0, -1, 0.4);
    canvas.touch_end(-1);

    canvas.set_tool(ToolKind::Line);
    canvas.set_foreground(Color::rgb(20, 20, 220));
    canvas.touch_start(5.0, 40.0, -1, 1.0);
    canvas.touch_move(60.0, 40.0, -1, 1.0);
    canvas.touch_end(-1);
}

#[test]
fn saved_composition_reloads_with_identical_appearance() {
    let mut canvas = small_canvas();
    paint_some_strokes(&mut canvas);

    let blob = canvas.save().unwrap();
    let reloaded = Canvas::from_saved(&blob, StyleConfig::default()).unwrap();

    assert_eq!(reloaded.layers.len(), canvas.layers.len());
    assert!(reloaded.layers.active_id().is_none());
    assert_eq!(
        canvas.flatten().pixels(),
        reloaded.flatten().pixels(),
        "flattened output differs after reload"
    );
}

#[test]
fn layer_attributes_survive_a_save_cycle() {
    let mut canvas = small_canvas();
    paint_some_strokes(&mut canvas);

    let extra = canvas.layers.add_layer(1);
    {
        let layer = canvas.layers.layer_mut(extra).unwrap();
        layer.name = "Shading".to_string();
        layer.blend_mode = BlendMode::Multiply;
        layer.opacity = 55;
        layer.visible = false;
    }

    let blob = canvas.save().unwrap();
    let reloaded = Canvas::from_saved(&blob, StyleConfig::default()).unwrap();

    let layer = reloaded.layers.layer_at(1);
    assert_eq!(layer.name, "Shading");
    assert_eq!(layer.blend_mode, BlendMode::Multiply);
    assert_eq!(layer.opacity, 55);
    assert!(!layer.visible);
}

#[test]
fn save_blob_round_trips_through_the_filesystem() {
    let mut canvas = small_canvas();
    paint_some_strokes(&mut canvas);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sketch.drw");
    fs::write(&path, canvas.save().unwrap()).unwrap();

    let bytes = fs::read(&path).unwrap();
    let reloaded = Canvas::from_saved(&bytes, StyleConfig::default()).unwrap();
    assert_eq!(canvas.flatten().pixels(), reloaded.flatten().pixels());
}

#[test]
fn flattened_export_decodes_to_the_composite_image() {
    let mut canvas = small_canvas();
    paint_some_strokes(&mut canvas);

    let png = canvas.flatten_png().unwrap();
    let image = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8();
    assert_eq!(image.dimensions(), (64, 48));

    let flat = canvas.flatten();
    // The brush stroke and the line are both present in the export.
    assert_ne!(image.get_pixel(10, 10).0[3], 0);
    assert_ne!(image.get_pixel(30, 40).0[3], 0);
    assert_eq!(image.as_raw().as_slice(), flat.data());
}

#[test]
fn editing_continues_after_a_reload() {
    let mut canvas = small_canvas();
    paint_some_strokes(&mut canvas);

    let blob = canvas.save().unwrap();
    let mut reloaded = Canvas::from_saved(&blob, StyleConfig::default()).unwrap();

    let id = reloaded.layers.layer_at(0).id();
    reloaded.layers.toggle_active(id);
    reloaded.set_foreground(Color::rgb(0, 200, 0));
    reloaded.touch_start(32.0, 24.0, -1, 1.0);
    reloaded.touch_end(-1);

    let buffer = &reloaded.layers.active_layer().unwrap().buffer;
    assert_eq!(buffer.color_at(32, 24), Color::rgb(0, 200, 0));

    // Undoing the new stroke returns to the loaded artwork, not a blank.
    assert!(reloaded.undo());
    assert_eq!(reloaded.flatten().pixels(), canvas.flatten().pixels());
}
