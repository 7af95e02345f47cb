use displacement_viewer::config::{Config, SequenceConfig};
use displacement_viewer::sequence::render_sequence;
use displacement_viewer::{
    CoordinateGrid, DisplacementField, FieldError, Orientation, Quiver, QuiverVisualiser,
    RenderOptions,
};
use ndarray::array;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn plain_options() -> RenderOptions {
    RenderOptions {
        width: 200,
        height: 160,
        title: None,
        axes: false,
        scale: None,
    }
}

#[test]
fn loads_and_renders_the_two_by_two_example() {
    let dir = TempDir::new().unwrap();
    let dx = write(dir.path(), "dx.csv", "1.0,2.0\n3.0,4.0");
    let dy = write(dir.path(), "dy.csv", "0.5,0.5\n0.5,0.5");

    let field = DisplacementField::load(&dx, &dy).unwrap();
    assert_eq!(field.shape(), (2, 2));
    assert_eq!(field.dx(), &array![[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(field.dy(), &array![[0.5, 0.5], [0.5, 0.5]]);

    let quiver = Quiver::build(&field, None, Orientation::Cartesian).unwrap();
    let output = dir.path().join("plots").join("quiver.png");
    let drawn = QuiverVisualiser::new(plain_options())
        .render(&quiver, &output)
        .unwrap();

    assert_eq!(drawn, 4);
    assert!(fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn huge_fixed_scale_clips_arrows_instead_of_overflowing() {
    let dir = TempDir::new().unwrap();
    let dx = write(dir.path(), "dx.csv", "-1.0,2.0\n3.0,4.0");
    let dy = write(dir.path(), "dy.csv", "0.5,0.5\n0.5,0.5");

    let field = DisplacementField::load(&dx, &dy).unwrap();
    let quiver = Quiver::build(&field, None, Orientation::Cartesian).unwrap();
    let options = RenderOptions {
        scale: Some(1e12),
        ..plain_options()
    };
    let drawn = QuiverVisualiser::new(options)
        .render(&quiver, &dir.path().join("huge.png"))
        .unwrap();
    assert_eq!(drawn, 4);
}

#[test]
fn image_orientation_renders_on_a_pixel_grid() {
    let dir = TempDir::new().unwrap();
    let dx = write(dir.path(), "dx.csv", "1,0,nan\n0,1,0\n-1,0,1\n");
    let dy = write(dir.path(), "dy.csv", "0,1,0\n1,0,-1\n0,-1,0\n");

    let field = DisplacementField::load(&dx, &dy).unwrap();
    let grid = CoordinateGrid::pixel_linspace(570, 512, 3);
    let quiver = Quiver::build(&field, Some(&grid), Orientation::Image).unwrap();
    assert_eq!(quiver.len(), 9);

    let output = dir.path().join("image.png");
    let drawn = QuiverVisualiser::new(plain_options())
        .render(&quiver, &output)
        .unwrap();
    assert_eq!(drawn, 8);
}

#[test]
fn mismatched_shapes_fail_before_rendering() {
    let dir = TempDir::new().unwrap();
    let dx = write(dir.path(), "dx.csv", "1,2,3\n4,5,6\n");
    let dy = write(dir.path(), "dy.csv", "1,2\n3,4\n");

    let err = DisplacementField::load(&dx, &dy).unwrap_err();
    assert!(matches!(err, FieldError::ShapeMismatch { dx: (2, 3), dy: (2, 2) }));
}

#[test]
fn ragged_and_empty_files_fail_to_load() {
    let dir = TempDir::new().unwrap();
    let ragged = write(dir.path(), "ragged.csv", "1,2\n3\n");
    let empty = write(dir.path(), "empty.csv", "");
    let good = write(dir.path(), "good.csv", "1,2\n3,4\n");

    assert!(matches!(
        DisplacementField::load(&ragged, &good).unwrap_err(),
        FieldError::Ragged { line: 2, .. }
    ));
    assert!(matches!(
        DisplacementField::load(&good, &empty).unwrap_err(),
        FieldError::Empty { .. }
    ));
}

#[test]
fn renders_a_numbered_sequence() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("out");
    fs::create_dir_all(&data).unwrap();
    for (first, second) in [(0, 1), (1, 2)] {
        write(&data, &format!("dx_{first}_{second}.csv"), "1,0\n0,1\n");
        write(&data, &format!("dy_{first}_{second}.csv"), "0,1\n1,0\n");
    }

    let mut config = Config::default();
    config.plot.axes = false;
    config.plot.image_width = 120;
    config.plot.image_height = 100;
    let sequence = SequenceConfig {
        dir: data,
        start: 0,
        end: 1,
        step: 1,
        output_dir: dir.path().join("frames"),
    };

    let written = render_sequence(&config, &sequence).unwrap();
    assert_eq!(written.len(), 2);
    assert!(written[1].ends_with("quiver_000001.png"));
    assert!(written.iter().all(|p| p.exists()));
}

#[test]
fn sequence_stops_at_a_missing_frame() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.plot.axes = false;
    let sequence = SequenceConfig {
        dir: dir.path().to_path_buf(),
        start: 0,
        end: 0,
        step: 1,
        output_dir: dir.path().join("frames"),
    };
    assert!(render_sequence(&config, &sequence).is_err());
}
