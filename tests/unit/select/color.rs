use super::*;

fn striped(w: u32, h: u32, bands: &[(u32, [u8; 3])]) -> image::RgbaImage {
    image::RgbaImage::from_fn(w, h, |x, _| {
        let mut end = 0;
        for &(cols, rgb) in bands {
            end += cols;
            if x < end {
                return image::Rgba([rgb[0], rgb[1], rgb[2], 255]);
            }
        }
        image::Rgba([0, 0, 0, 255])
    })
}

#[test]
fn primary_hues_land_in_their_buckets() {
    let cases = [
        ([255, 0, 0], ColorBucket::Red),
        ([255, 100, 0], ColorBucket::Orange),
        ([255, 220, 0], ColorBucket::Yellow),
        ([0, 255, 0], ColorBucket::Green),
        ([0, 255, 255], ColorBucket::Cyan),
        ([0, 0, 255], ColorBucket::Blue),
        ([128, 0, 255], ColorBucket::Purple),
        ([255, 0, 200], ColorBucket::Pink),
        ([140, 100, 70], ColorBucket::Brown),
        ([250, 250, 250], ColorBucket::White),
        ([10, 10, 10], ColorBucket::Black),
        ([128, 128, 128], ColorBucket::Gray),
    ];
    for (rgb, want) in cases {
        assert_eq!(ColorBucket::classify(rgb), want, "{rgb:?}");
    }
}

#[test]
fn nearest_bucket_uses_box_centers() {
    assert_eq!(nearest_bucket(230.0, 0.625, 0.625), ColorBucket::Blue);
    assert_eq!(nearest_bucket(355.0, 0.75, 0.75), ColorBucket::Red);
}

#[test]
fn hsv_conversion_matches_reference_points() {
    assert_eq!(rgb_to_hsv([255, 0, 0]), (0.0, 1.0, 1.0));
    let (h, s, v) = rgb_to_hsv([0, 0, 255]);
    assert!((h - 240.0).abs() < 1e-3 && s == 1.0 && v == 1.0);
    assert_eq!(rgb_to_hsv([0, 0, 0]), (0.0, 0.0, 0.0));
}

#[test]
fn bucket_names_parse_and_serialize() {
    assert_eq!("Grey".parse::<ColorBucket>().unwrap(), ColorBucket::Gray);
    assert_eq!(" blue ".parse::<ColorBucket>().unwrap(), ColorBucket::Blue);
    assert!("teal".parse::<ColorBucket>().is_err());
    assert_eq!(
        serde_json::to_string(&ColorBucket::Purple).unwrap(),
        "\"purple\""
    );
    for b in ColorBucket::ALL {
        assert_eq!(b.to_string().parse::<ColorBucket>().unwrap(), b);
    }
}

#[test]
fn solid_image_is_its_own_dominant_color() {
    let img = striped(50, 50, &[(50, [255, 0, 0])]);
    let d = dominant_color(&img).unwrap();
    assert_eq!(d.bucket, ColorBucket::Red);
    assert!((d.share - 1.0).abs() < 1e-6);
}

#[test]
fn colorful_cluster_beats_minority_gray_backdrop() {
    let img = striped(30, 30, &[(14, [128, 128, 128]), (9, [0, 0, 255]), (7, [255, 255, 0])]);
    let d = dominant_color(&img).unwrap();
    assert_eq!(d.bucket, ColorBucket::Blue);
    assert_eq!(d.rgb, [0, 0, 255]);
    assert!((d.share - 0.3).abs() < 1e-3);
}

#[test]
fn majority_gray_is_kept() {
    let img = striped(30, 30, &[(20, [128, 128, 128]), (10, [0, 0, 255])]);
    let d = dominant_color(&img).unwrap();
    assert_eq!(d.bucket, ColorBucket::Gray);
}

#[test]
fn analysis_is_deterministic() {
    let img = image::RgbaImage::from_fn(64, 48, |x, y| {
        image::Rgba([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8, 255])
    });
    assert_eq!(dominant_color(&img).unwrap(), dominant_color(&img).unwrap());
}

#[test]
fn empty_image_is_rejected() {
    assert!(dominant_color(&image::RgbaImage::new(0, 0)).is_err());
}
