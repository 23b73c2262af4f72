/// 縮小倍率を計算する（拡大はしない）
///
/// アスペクト比を維持しつつ、指定された領域に収まる最大の倍率を返す（最大1.0）
fn calculate_scale_factor(src_w: u32, src_h: u32, box_w: u32, box_h: u32) -> f64 {
    let scale_w = box_w as f64 / src_w as f64;
    let scale_h = box_h as f64 / src_h as f64;

    scale_w.min(scale_h).min(1.0)
}

/// 倍率を適用して新しい寸法を計算する
fn apply_scale(src_w: u32, src_h: u32, scale: f64) -> (u32, u32) {
    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;

    // 最小1pxを保証
    (new_w.max(1), new_h.max(1))
}

/// Contain 寸法を計算する
///
/// アスペクト比を維持しつつ `box_w` x `box_h` に収まるように縮小する。
/// 元画像が領域内に収まっている場合はそのままの寸法を返す。
pub fn calculate_contain_dimensions(src_w: u32, src_h: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    let scale = calculate_scale_factor(src_w, src_h, box_w, box_h);
    let (w, h) = apply_scale(src_w, src_h, scale);

    // 丸めで領域をはみ出さないようにする
    (w.min(box_w.max(1)), h.min(box_h.max(1)))
}

/// Cover 寸法を計算する
///
/// アスペクト比を維持しつつ `box_w` x `box_h` を覆う最小の寸法を返す（拡大あり）
pub fn calculate_cover_dimensions(src_w: u32, src_h: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    let scale = (box_w as f64 / src_w as f64).max(box_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).max(box_w);
    let h = ((src_h as f64 * scale).round() as u32).max(box_h);
    (w, h)
}

/// 間引きデコードの倍率（inSampleSize 相当）を計算する
///
/// 幅・高さの比の大きい方から始め、間引き後のピクセル数が
/// 要求ピクセル数の 2 倍以下になるまで倍率を上げる
pub fn calculate_in_sample_size(src_w: u32, src_h: u32, req_w: u32, req_h: u32) -> u32 {
    let req_w = req_w.max(1);
    let req_h = req_h.max(1);

    let mut sample_size = 1u32;
    if src_h > req_h || src_w > req_w {
        let height_ratio = (src_h as f64 / req_h as f64).round() as u32;
        let width_ratio = (src_w as f64 / req_w as f64).round() as u32;
        sample_size = height_ratio.max(width_ratio).max(1);
    }

    let total_pixels = src_w as f64 * src_h as f64;
    let total_req_pixels_cap = req_w as f64 * req_h as f64 * 2.0;
    while total_pixels / (sample_size as f64 * sample_size as f64) > total_req_pixels_cap {
        sample_size += 1;
    }

    sample_size
}
