use std::sync::Arc;

use nalgebra::{point, vector};
use proptest::prelude::*;
use volvis_lib::{
    camera::OrbitCamera,
    color,
    controller::{Controller, Message, View},
    landscape::{LandscapeData, LandscapeRenderer, LandscapeSurfaceBuilder, Node, Selection},
    render::{
        create_technique, Capabilities, Device, FrameBuffer, ObjectAlignedSlicing, RayMarch,
        RenderOptions, RenderTechnique, TechniqueKind, MAX_STEPS,
    },
    render_frame, test_helpers,
    transfer_function::{ControlPoint, TransferFunction},
    volumetric::{parse_volume, NormalizationPolicy, VolumeGrid},
};

const CUBE: &str = "# vtk DataFile Version 3.0
handcrafted cube
ASCII
DATASET STRUCTURED_POINTS
DIMENSIONS 2 2 2
SPACING 1 1 1
ORIGIN 0 0 0
POINT_DATA 8
SCALARS density unsigned_char 1
LOOKUP_TABLE default
0 36 73 109
146 182 219 255
";

#[test]
fn handcrafted_cube_parses() {
    let volume = parse_volume(CUBE, NormalizationPolicy::LinearRescale).unwrap();
    assert_eq!(volume.get_size(), vector![2, 2, 2]);
    assert_eq!(volume.spacing(), vector![1.0, 1.0, 1.0]);
    assert_eq!(volume.data().len(), 8);
    assert_eq!(volume.data().iter().min(), Some(&0));
    assert_eq!(volume.data().iter().max(), Some(&255));
}

#[test]
fn midpoint_samples_to_mean() {
    let tf = TransferFunction::from_points(vec![
        ControlPoint::new(0.0, color::rgb(0.0, 0.2, 1.0), 0.0),
        ControlPoint::new(0.3, color::rgb(1.0, 1.0, 0.0), 0.6),
        ControlPoint::new(1.0, color::rgb(0.5, 0.0, 0.0), 1.0),
    ])
    .unwrap();

    let c = tf.sample_color(0.15);
    assert!((c - color::rgb(0.5, 0.6, 0.5)).norm() < 1e-6);
    assert!((tf.sample_opacity(0.65) - 0.8).abs() < 1e-6);
}

#[test]
fn boundary_points_stay_pinned() {
    let mut tf = TransferFunction::new();
    tf.add_point();
    assert!(tf.move_point(0, 0.1, 0.0).is_err());
    let last = tf.len() - 1;
    assert!(tf.move_point(last, 0.9, 1.0).is_err());
    assert_eq!(tf.points()[0].iso, 0.0);
    assert_eq!(tf.points()[last].iso, 1.0);
}

#[test]
fn object_aligned_draws_farthest_first() {
    let device = Device::default();
    let volume = Arc::new(test_helpers::gradient_volume(
        vector![4, 4, 6],
        vector![1.0, 1.0, 1.0],
    ));
    let lut = TransferFunction::new().lut();
    let oas = ObjectAlignedSlicing::new(&device, volume, lut, RenderOptions::default()).unwrap();
    assert_eq!(*oas.camera(), OrbitCamera::new(0.0, 0.0, 2.5));

    let z: Vec<f32> = oas
        .draw_order()
        .into_iter()
        .map(|i| oas.layer_z(i).unwrap())
        .collect();
    assert_eq!(z.len(), 6);
    assert!(z.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn every_technique_renders_and_releases() {
    for caps in [Capabilities::default(), Capabilities::without_3d()] {
        let device = Device::new(caps);
        let volume = Arc::new(test_helpers::gradient_volume(
            vector![6, 6, 6],
            vector![1.0, 1.0, 1.0],
        ));
        for kind in TechniqueKind::ALL {
            let lut = TransferFunction::new().lut();
            let mut technique = create_technique(
                kind,
                &device,
                Arc::clone(&volume),
                lut,
                RenderOptions::default(),
            )
            .unwrap();
            let mut frame = FrameBuffer::new(24, 24);
            technique.render(&mut frame);
            assert_eq!(frame.get(0, 0), color::white(), "{kind}");
            assert_ne!(frame.get(12, 12), color::white(), "{kind}");

            technique.cleanup();
            drop(technique);
            assert_eq!(device.stats().live(), 0, "{kind}");
        }
    }
}

#[test]
fn single_node_landscape_is_flat() {
    let data = LandscapeData::new(vec![Node::new([0.3, 0.7], 5.0)], vec![]);
    let mut builder = LandscapeSurfaceBuilder::new();
    builder.set_data(&data);
    let field = builder.height_field().unwrap();
    assert!(field.heights().iter().all(|&h| h == 5.0));
}

#[test]
fn empty_landscape_is_idle() {
    let mut builder = LandscapeSurfaceBuilder::new();
    builder.set_data(&LandscapeData::from_json(r#"{"nodes": [], "link": []}"#).unwrap());
    assert!(builder.geometry().unwrap().is_empty());

    let mut frame = FrameBuffer::new(16, 16);
    LandscapeRenderer::new().render(&builder, &mut frame);
    assert!(frame.pixels().iter().all(|&c| c == color::white()));
}

#[test]
fn controller_round_trip() {
    let mut controller = Controller::default();
    let sender = controller.sender();

    sender.send(Message::Select(Selection {
        node: 3,
        value: 200.0,
        neighbours: vec![0, 2],
    }));
    sender.send(Message::VolumeLoaded(Ok(test_helpers::cube_volume())));
    sender.send(Message::Landscape(test_helpers::square_landscape()));
    sender.send(Message::ViewportReady);
    sender.send(Message::SetTechnique(TechniqueKind::RayMarching));
    sender.send(Message::Drag {
        view: View::Landscape,
        dx: 10.0,
        dy: 0.0,
    });
    controller.frame(32, 32);

    assert_eq!(controller.active_technique(), Some(TechniqueKind::RayMarching));
    assert!(controller.transfer_function().highlight().is_some());
    assert_eq!(controller.landscape().selection().map(|s| s.node), Some(3));
    assert_eq!(controller.landscape_renderer().camera().rotation_y, 5.0);
    assert_eq!(controller.volume_frame().width(), 32);
    assert!(controller
        .landscape_frame()
        .pixels()
        .iter()
        .any(|&c| c != color::white()));
}

#[test]
fn one_off_frame() {
    let rgb = render_frame(
        test_helpers::cube_volume(),
        TechniqueKind::ViewAlignedSlicing,
        OrbitCamera::default(),
        10,
        8,
    )
    .unwrap();
    assert_eq!(rgb.len(), 3 * 10 * 8);
    assert_eq!(&rgb[0..3], &[255, 255, 255]);
}

proptest! {
    #[test]
    fn ray_alpha_is_monotonic(
        entry in prop::array::uniform3(0.0f32..=1.0),
        exit in prop::array::uniform3(0.0f32..=1.0),
        step in 1e-4f32..0.1,
        value in any::<u8>(),
    ) {
        let device = Device::default();
        let volume = test_helpers::solid_volume(vector![3, 3, 3], value);
        let texture = device
            .create_volume_texture(&volume, TechniqueKind::RayMarching)
            .unwrap();
        let lut = TransferFunction::new().lut();

        let entry = point![entry[0], entry[1], entry[2]];
        let exit = point![exit[0], exit[1], exit[2]];
        if let Some(march) = RayMarch::new(&texture, &lut, entry, exit, step, 1.0) {
            prop_assert!(march.num_steps() <= MAX_STEPS);
            let alphas: Vec<f32> = march.map(|c| c.w).collect();
            prop_assert!(alphas.len() <= MAX_STEPS);
            prop_assert!(alphas.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(alphas.iter().all(|&a| (0.0..=1.0 + 1e-6).contains(&a)));
        }
    }

    #[test]
    fn edits_keep_points_ordered(
        edits in prop::collection::vec((0usize..6, 0.0f32..=1.0, 0.0f32..=1.0), 0..20),
    ) {
        let mut tf = TransferFunction::new();
        for (index, iso, opacity) in edits {
            if index == 5 {
                tf.add_point();
            } else {
                let _ = tf.move_point(index, iso, opacity);
            }
        }
        let points = tf.points();
        prop_assert_eq!(points[0].iso, 0.0);
        prop_assert_eq!(points[points.len() - 1].iso, 1.0);
        prop_assert!(points.windows(2).all(|w| w[0].iso < w[1].iso));
        prop_assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.opacity)));
    }
}
