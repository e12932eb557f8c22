use convmask_image::Rgba16;

/// Utility function to convert 16-bit big endian `Vec<u8>` to `Vec<u16>`
pub fn convert_buf_u8_u16(buf: Vec<u8>) -> Vec<u16> {
    let mut buf_u16 = Vec::with_capacity(buf.len() / 2);
    for chunk in buf.chunks_exact(2) {
        buf_u16.push(u16::from_be_bytes([chunk[0], chunk[1]]));
    }

    buf_u16
}

/// Utility function to convert `&[u16]` to 16-bit big endian `Vec<u8>`
pub fn convert_buf_u16_u8(buf: &[u16]) -> Vec<u8> {
    let mut buf_u8: Vec<u8> = Vec::with_capacity(buf.len() * 2);

    for byte in buf {
        let be_bytes = byte.to_be_bytes();
        buf_u8.extend_from_slice(&be_bytes);
    }

    buf_u8
}

/// Big endian bytes of the RGB channels of an RGBA16 buffer, alpha dropped.
pub fn convert_buf_rgba16_rgb16_u8(buf: &[u16]) -> Vec<u8> {
    let mut buf_u8: Vec<u8> = Vec::with_capacity(buf.len() / 4 * 6);

    for px in buf.chunks_exact(4) {
        for v in &px[..3] {
            buf_u8.extend_from_slice(&v.to_be_bytes());
        }
    }

    buf_u8
}

/// Narrow an RGBA16 buffer to RGB8, compositing over black.
///
/// The color channels are premultiplied by alpha and keep their upper 8 bits.
pub fn convert_buf_rgba16_rgb8(buf: &[u16]) -> Vec<u8> {
    buf.chunks_exact(4)
        .flat_map(|px| {
            Rgba16::new(px[0], px[1], px[2], px[3])
                .premultiplied()
                .map(|v| (v >> 8) as u8)
        })
        .collect()
}
