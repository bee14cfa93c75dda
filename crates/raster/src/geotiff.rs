//! Georeferenced multi-band TIFF reading and writing.
//!
//! Written files carry one grayscale `f32` directory per band, with GeoTIFF
//! georeferencing (ModelPixelScale, ModelTiepoint, geographic WGS84 geokeys)
//! and the GDAL nodata convention on the first directory. The reader also
//! accepts single-directory files with interleaved samples, which is what
//! external warp tools emit, and deinterleaves them.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tiff::decoder::{ifd, Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::ColorType;

use crate::error::{RasterError, RasterResult};
use crate::profile::{DType, GeoTransform, RasterProfile};
use crate::Raster;

/// GeoKey directory declaring a geographic WGS84 (EPSG:4326) raster.
const WGS84_GEO_KEYS: [u16; 16] = [
    1, 1, 0, 3, // version, revision, minor, key count
    1024, 0, 1, 2, // ModelTypeGeographic
    1025, 0, 1, 1, // RasterPixelIsArea
    2048, 0, 1, 4326, // GeographicTypeGeoKey
];

/// Write a raster to `path`, one directory per band.
pub fn write(path: &Path, raster: &Raster) -> RasterResult<()> {
    let profile = raster.profile();
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;

    for (index, band) in raster.bands().iter().enumerate() {
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(profile.width as u32, profile.height as u32)?;

        if index == 0 {
            let t = &profile.transform;
            let dir = image.encoder();
            dir.write_tag(
                Tag::ModelPixelScaleTag,
                &[t.pixel_width, t.pixel_height, 0.0][..],
            )?;
            dir.write_tag(
                Tag::ModelTiepointTag,
                &[0.0, 0.0, 0.0, t.origin_lon, t.origin_lat, 0.0][..],
            )?;
            dir.write_tag(Tag::GeoKeyDirectoryTag, &WGS84_GEO_KEYS[..])?;
            if let Some(nodata) = profile.nodata {
                dir.write_tag(Tag::GdalNodata, format!("{nodata}").as_str())?;
            }
        }

        image.write_data(band)?;
    }

    Ok(())
}

/// Read a raster from `path`.
///
/// All sample formats are widened to `f32`; the profile's dtype records the
/// narrowest storage type seen in the file.
pub fn read(path: &Path) -> RasterResult<Raster> {
    let file = BufReader::new(File::open(path)?);
    let mut decoder = Decoder::new(file)?.with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let transform = read_transform(&mut decoder, path)?;
    let nodata = read_nodata(&mut decoder);

    let mut bands: Vec<Vec<f32>> = Vec::new();
    let mut dtype = DType::Float32;

    loop {
        let samples = samples_per_pixel(decoder.colortype()?)?;
        let (plane, page_dtype) = decode_page(decoder.read_image()?)?;
        if bands.is_empty() {
            dtype = page_dtype;
        }

        if samples == 1 {
            bands.push(plane);
        } else {
            // Interleaved samples: split into one plane per band.
            let pixels = plane.len() / samples;
            let mut split = vec![Vec::with_capacity(pixels); samples];
            for chunk in plane.chunks_exact(samples) {
                for (band, &value) in split.iter_mut().zip(chunk) {
                    band.push(value);
                }
            }
            bands.extend(split);
        }

        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    let profile = RasterProfile {
        width,
        height,
        bands: bands.len(),
        crs: "EPSG:4326".to_string(),
        transform,
        dtype,
        nodata,
    };
    Raster::new(profile, bands)
}

fn read_transform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
) -> RasterResult<GeoTransform> {
    let scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)?
        .map(ifd::Value::into_f64_vec)
        .transpose()?;
    let tiepoint = decoder
        .find_tag(Tag::ModelTiepointTag)?
        .map(ifd::Value::into_f64_vec)
        .transpose()?;

    match (scale, tiepoint) {
        (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 5 => Ok(GeoTransform {
            origin_lon: tie[3],
            origin_lat: tie[4],
            pixel_width: scale[0],
            pixel_height: scale[1],
        }),
        _ => Err(RasterError::MissingGeoref(path.display().to_string())),
    }
}

fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    match decoder.find_tag(Tag::GdalNodata) {
        Ok(Some(ifd::Value::Ascii(text))) => text.trim_end_matches('\0').trim().parse().ok(),
        _ => None,
    }
}

fn samples_per_pixel(colortype: ColorType) -> RasterResult<usize> {
    match colortype {
        ColorType::Gray(_) => Ok(1),
        ColorType::GrayA(_) => Ok(2),
        ColorType::RGB(_) => Ok(3),
        ColorType::RGBA(_) => Ok(4),
        ColorType::Multiband { num_samples, .. } => Ok(num_samples as usize),
        other => Err(RasterError::Unsupported(format!(
            "color type {other:?} is not a band layout this reader handles"
        ))),
    }
}

fn decode_page(result: DecodingResult) -> RasterResult<(Vec<f32>, DType)> {
    let converted = match result {
        DecodingResult::U8(data) => (data.into_iter().map(f32::from).collect(), DType::UInt8),
        DecodingResult::I8(data) => (data.into_iter().map(f32::from).collect(), DType::UInt8),
        DecodingResult::U16(data) => (data.into_iter().map(f32::from).collect(), DType::Int16),
        DecodingResult::I16(data) => (data.into_iter().map(f32::from).collect(), DType::Int16),
        DecodingResult::U32(data) => (
            data.into_iter().map(|v| v as f32).collect(),
            DType::Float32,
        ),
        DecodingResult::I32(data) => (
            data.into_iter().map(|v| v as f32).collect(),
            DType::Float32,
        ),
        DecodingResult::U64(data) => (
            data.into_iter().map(|v| v as f32).collect(),
            DType::Float32,
        ),
        DecodingResult::I64(data) => (
            data.into_iter().map(|v| v as f32).collect(),
            DType::Float32,
        ),
        DecodingResult::F32(data) => (data, DType::Float32),
        DecodingResult::F64(data) => (
            data.into_iter().map(|v| v as f32).collect(),
            DType::Float32,
        ),
        _ => {
            return Err(RasterError::Unsupported(
                "sample precision this reader does not handle".to_string(),
            ))
        }
    };
    Ok(converted)
}
