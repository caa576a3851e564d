//! Sizing policy: how small can each asset safely get?
//!
//! All functions here are pure: no I/O, no pixels. The policy reads the
//! aggregated usage stats and the physical size of every loaded image and
//! produces one [`OptimizationTask`] per used asset.
//!
//! ## Rules
//!
//! ```text
//! requested = override size                              (user override)
//!           | ceil(max_render * (1 + buffer / 100))      (otherwise)
//! target    = max(1, min(requested, physical))           (per axis)
//! ```
//!
//! Targets never exceed the physical resolution, overrides included. Assets
//! with no usage stat are dropped from the plan.

use crate::naming::output_name;
use crate::types::{AssetUsageStat, LoadedSourceImage, OptimizationTask};
use std::collections::BTreeMap;

/// Clamp a requested size on one axis into `[1, cap]`.
///
/// NaN and requests below 1 collapse to 1; `+inf` reaches the cap.
pub fn clamp_axis(requested: f64, cap: u32) -> u32 {
    if requested.is_nan() || requested < 1.0 {
        return 1;
    }
    let cap = cap.max(1);
    if requested >= cap as f64 {
        cap
    } else {
        requested as u32
    }
}

/// Requested size for one axis before clamping.
///
/// # Examples
/// ```
/// # use sizewise::sizing::requested_axis;
/// assert_eq!(requested_axis(100.0, 0.0), 100.0);
/// assert_eq!(requested_axis(100.0, 50.0), 150.0);
/// assert_eq!(requested_axis(99.2, 0.0), 100.0);
/// ```
pub fn requested_axis(max_render: f64, buffer_percentage: f64) -> f64 {
    (max_render * (1.0 + buffer_percentage / 100.0)).ceil()
}

/// Target `(width, height)` for one asset.
pub fn target_size(
    stat: &AssetUsageStat,
    physical: (u32, u32),
    buffer_percentage: f64,
) -> (u32, u32) {
    let (req_w, req_h) = match stat.user_override {
        Some(ov) => (ov.width as f64, ov.height as f64),
        None => (
            requested_axis(stat.max_render_width, buffer_percentage),
            requested_axis(stat.max_render_height, buffer_percentage),
        ),
    };
    (clamp_axis(req_w, physical.0), clamp_axis(req_h, physical.1))
}

/// Compute the optimization plan.
///
/// Iterates loaded images in key order, drops unused ones, and returns tasks
/// with every resize task ahead of every pass-through task. Within each
/// group tasks are ordered by original path.
pub fn compute_tasks(
    stats: &BTreeMap<String, AssetUsageStat>,
    loaded: &BTreeMap<String, LoadedSourceImage>,
    buffer_percentage: f64,
) -> Vec<OptimizationTask> {
    let mut tasks: Vec<OptimizationTask> = loaded
        .iter()
        .filter_map(|(key, image)| {
            let Some(stat) = stats.get(key) else {
                tracing::debug!(asset = %key, "no usage recorded, excluding");
                return None;
            };
            Some(plan_one(stat, image, buffer_percentage))
        })
        .collect();

    tasks.sort_by(|a, b| {
        b.is_resize
            .cmp(&a.is_resize)
            .then_with(|| a.original_path.cmp(&b.original_path))
    });
    tasks
}

fn plan_one(
    stat: &AssetUsageStat,
    image: &LoadedSourceImage,
    buffer_percentage: f64,
) -> OptimizationTask {
    let physical = image.physical_size();
    let (target_width, target_height) = target_size(stat, physical, buffer_percentage);

    OptimizationTask {
        output_name: output_name(&image.relative_path),
        original_path: image.relative_path.clone(),
        physical_width: physical.0,
        physical_height: physical.1,
        target_width,
        target_height,
        source: image.bytes.clone(),
        max_scale: stat.max_scale_x.max(stat.max_scale_y),
        is_resize: (target_width, target_height) != physical,
        override_percentage: stat.user_override.map(|ov| ov.percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserOverride;
    use std::sync::Arc;

    fn stat(w: f64, h: f64) -> AssetUsageStat {
        AssetUsageStat {
            max_render_width: w,
            max_render_height: h,
            max_scale_x: 1.0,
            max_scale_y: 1.0,
            user_override: None,
        }
    }

    fn image(path: &str, w: u32, h: u32) -> LoadedSourceImage {
        LoadedSourceImage {
            width: w,
            height: h,
            source_width: None,
            source_height: None,
            bytes: Arc::from(vec![0u8; 4]),
            relative_path: path.to_string(),
        }
    }

    fn index(images: Vec<LoadedSourceImage>) -> BTreeMap<String, LoadedSourceImage> {
        images
            .into_iter()
            .map(|i| (i.relative_path.clone(), i))
            .collect()
    }

    // =========================================================================
    // clamp_axis / requested_axis
    // =========================================================================

    #[test]
    fn clamp_axis_bounds() {
        assert_eq!(clamp_axis(0.0, 100), 1);
        assert_eq!(clamp_axis(-5.0, 100), 1);
        assert_eq!(clamp_axis(f64::NAN, 100), 1);
        assert_eq!(clamp_axis(f64::NEG_INFINITY, 100), 1);
        assert_eq!(clamp_axis(f64::INFINITY, 100), 100);
        assert_eq!(clamp_axis(50.0, 100), 50);
        assert_eq!(clamp_axis(500.0, 100), 100);
    }

    #[test]
    fn requested_axis_rounds_up() {
        assert_eq!(requested_axis(10.1, 0.0), 11.0);
        assert_eq!(requested_axis(64.0, 100.0), 128.0);
    }

    // =========================================================================
    // compute_tasks
    // =========================================================================

    #[test]
    fn unused_assets_are_excluded() {
        let loaded = index(vec![
            image("a.png", 100, 100),
            image("b.png", 100, 100),
            image("c.png", 100, 100),
        ]);
        let stats = BTreeMap::from([("b.png".to_string(), stat(50.0, 50.0))]);

        let tasks = compute_tasks(&stats, &loaded, 0.0);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].original_path, "b.png");
    }

    #[test]
    fn never_upscales_past_physical() {
        let mut img = image("a.png", 50, 50);
        img.source_width = Some(100);
        img.source_height = Some(80);
        let loaded = index(vec![img]);
        let stats = BTreeMap::from([("a.png".to_string(), stat(200.0, 10.0))]);

        let task = &compute_tasks(&stats, &loaded, 0.0)[0];
        assert_eq!((task.physical_width, task.physical_height), (100, 80));
        assert_eq!((task.target_width, task.target_height), (100, 10));
        assert!(task.is_resize);
    }

    #[test]
    fn overflowing_request_keeps_physical_size() {
        let loaded = index(vec![image("huge.png", 500, 500)]);
        let stats = BTreeMap::from([("huge.png".to_string(), stat(1e308, 1e308))]);

        for buffer in [0.0, 100.0] {
            let task = &compute_tasks(&stats, &loaded, buffer)[0];
            assert_eq!((task.target_width, task.target_height), (500, 500));
            assert!(!task.is_resize);
        }
    }

    #[test]
    fn larger_usage_than_source_is_not_a_resize() {
        let mut img = image("a.png", 100, 100);
        img.source_width = Some(100);
        let loaded = index(vec![img]);
        let stats = BTreeMap::from([("a.png".to_string(), stat(200.0, 200.0))]);

        let task = &compute_tasks(&stats, &loaded, 0.0)[0];
        assert_eq!(task.target_width, 100);
        assert!(!task.is_resize);
    }

    #[test]
    fn buffer_inflates_requested_size() {
        let loaded = index(vec![image("a.png", 1000, 1000)]);
        let stats = BTreeMap::from([("a.png".to_string(), stat(100.0, 41.0))]);

        let task = &compute_tasks(&stats, &loaded, 50.0)[0];
        assert_eq!(task.target_width, 150);
        assert_eq!(task.target_height, 62); // ceil(61.5)
    }

    #[test]
    fn non_override_matches_formula() {
        let loaded = index(vec![image("a.png", 300, 300)]);
        for (render, buffer) in [(10.0, 0.0), (99.5, 25.0), (250.0, 50.0), (0.0, 0.0)] {
            let stats = BTreeMap::from([("a.png".to_string(), stat(render, render))]);
            let task = &compute_tasks(&stats, &loaded, buffer)[0];
            let expected = ((render * (1.0 + buffer / 100.0)).ceil() as u32).clamp(1, 300);
            assert_eq!(task.target_width, expected, "render={render} buffer={buffer}");
        }
    }

    #[test]
    fn override_ignores_buffer_and_is_capped() {
        let loaded = index(vec![image("a.png", 200, 100)]);
        let mut s = stat(10.0, 10.0);
        s.user_override = Some(UserOverride {
            percentage: 150.0,
            width: 300,
            height: 60,
        });
        let stats = BTreeMap::from([("a.png".to_string(), s)]);

        for buffer in [0.0, 20.0, 500.0] {
            let task = &compute_tasks(&stats, &loaded, buffer)[0];
            assert_eq!((task.target_width, task.target_height), (200, 60));
            assert_eq!(task.override_percentage, Some(150.0));
        }
    }

    #[test]
    fn zero_override_clamps_to_one() {
        let loaded = index(vec![image("a.png", 200, 100)]);
        let mut s = stat(10.0, 10.0);
        s.user_override = Some(UserOverride {
            percentage: 0.0,
            width: 0,
            height: 0,
        });
        let stats = BTreeMap::from([("a.png".to_string(), s)]);

        let task = &compute_tasks(&stats, &loaded, 0.0)[0];
        assert_eq!((task.target_width, task.target_height), (1, 1));
    }

    #[test]
    fn resize_tasks_come_first_then_by_path() {
        let loaded = index(vec![
            image("d.png", 10, 10),
            image("c.png", 100, 100),
            image("b.png", 10, 10),
            image("a.png", 100, 100),
        ]);
        let stats: BTreeMap<String, AssetUsageStat> = ["a.png", "b.png", "c.png", "d.png"]
            .iter()
            .map(|k| (k.to_string(), stat(50.0, 50.0)))
            .collect();

        let tasks = compute_tasks(&stats, &loaded, 0.0);
        let order: Vec<(&str, bool)> = tasks
            .iter()
            .map(|t| (t.original_path.as_str(), t.is_resize))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.png", true),
                ("c.png", true),
                ("b.png", false),
                ("d.png", false)
            ]
        );
        let first_pass = tasks.iter().position(|t| !t.is_resize).unwrap();
        assert!(tasks[first_pass..].iter().all(|t| !t.is_resize));
    }

    #[test]
    fn task_records_naming_and_scale() {
        let loaded = index(vec![image("ui/btn.v2.jpg", 64, 64)]);
        let mut s = stat(32.0, 32.0);
        s.max_scale_x = 0.5;
        s.max_scale_y = 1.5;
        let stats = BTreeMap::from([("ui/btn.v2.jpg".to_string(), s)]);

        let task = &compute_tasks(&stats, &loaded, 0.0)[0];
        assert_eq!(task.output_name, "ui/btn.v2.png");
        assert_eq!(task.max_scale, 1.5);
        assert_eq!(task.override_percentage, None);
        assert_eq!(&*task.source, &[0u8; 4]);
    }

    #[test]
    fn every_target_within_bounds() {
        let loaded = index(vec![
            image("a.png", 1, 1),
            image("b.png", 7, 3000),
            image("c.png", 512, 512),
        ]);
        let stats: BTreeMap<String, AssetUsageStat> = [
            ("a.png", stat(0.0, 9999.0)),
            ("b.png", stat(6.2, 12.0)),
            ("c.png", stat(-4.0, 511.9)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        for task in compute_tasks(&stats, &loaded, 33.0) {
            assert!(task.target_width >= 1 && task.target_width <= task.physical_width);
            assert!(task.target_height >= 1 && task.target_height <= task.physical_height);
        }
    }
}
