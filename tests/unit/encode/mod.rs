use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "spriteforge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn write_atomically_creates_parents_and_leaves_no_temp_file() {
    let dir = temp_dir("write_atomically");
    let path = dir.join("nested").join("out.bin");

    write_atomically(&path, b"abc").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    assert!(!dir.join("nested").join("out.bin.partial").exists());

    write_atomically(&path, b"replaced").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"replaced");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn encode_image_png_decodes_back() {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]));
    let bytes = encode_image(&img, image::ImageFormat::Png).unwrap();
    let back = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(back, img);
}
