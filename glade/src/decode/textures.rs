use super::{for_each_element, read_index};
use crate::arena::Arena;
use crate::census::Census;
use crate::cursor::TokenCursor;
use crate::io::ReadFile;
use crate::keys::Key;
use crate::{Error, Image, ImageSource, Sampler, Texture, TextureFilter, WrapMode};

const FILTER_NEAREST: i64 = 9728;
const FILTER_LINEAR: i64 = 9729;
const FILTER_NEAREST_MIPMAP_NEAREST: i64 = 9984;
const FILTER_LINEAR_MIPMAP_NEAREST: i64 = 9985;
const FILTER_NEAREST_MIPMAP_LINEAR: i64 = 9986;
const FILTER_LINEAR_MIPMAP_LINEAR: i64 = 9987;

pub(super) fn decode_images<R: ReadFile + ?Sized>(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
    io: &mut R,
) -> Result<(), Error> {
    for_each_element(cursor, census.images, |cursor, index, keys| {
        let mut uri = None;
        let mut view = None;
        let mut mime_type = None;

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Uri => uri = Some(cursor.read_string()?.into_owned()),
                Key::BufferView => view = read_index(cursor)?,
                Key::MimeType => mime_type = Some(cursor.read_string()?.into_owned()),
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        let source = match (uri, view) {
            (Some(uri), _) => {
                let bytes = io.read(&uri)?;
                log::trace!("image {index}: read {} bytes from '{uri}'", bytes.len());
                ImageSource::Uri { uri, bytes }
            }
            (None, Some(view)) => ImageSource::View { view, mime_type },
            (None, None) => return Err(Error::MissingImageSource { image: index }),
        };
        arena.images.push(Image { source });
        Ok(())
    })
}

/// Filter and mipmap flag for a glTF `magFilter`/`minFilter` pair.
pub(crate) fn derive_filter(mag: Option<i64>, min: Option<i64>) -> (TextureFilter, bool) {
    let mipmaps = !matches!(min, Some(FILTER_NEAREST | FILTER_LINEAR));
    let nearest = mag == Some(FILTER_NEAREST)
        || matches!(
            min,
            Some(FILTER_NEAREST | FILTER_NEAREST_MIPMAP_NEAREST | FILTER_NEAREST_MIPMAP_LINEAR)
        );
    let filter = if nearest {
        TextureFilter::Nearest
    } else {
        match min {
            Some(FILTER_LINEAR | FILTER_LINEAR_MIPMAP_NEAREST) => TextureFilter::Bilinear,
            _ => TextureFilter::Trilinear,
        }
    };
    (filter, mipmaps)
}

fn read_filter_code(cursor: &mut TokenCursor<'_>, sampler: usize) -> Result<Option<i64>, Error> {
    let code = cursor.read_i64()?;
    match code {
        FILTER_NEAREST
        | FILTER_LINEAR
        | FILTER_NEAREST_MIPMAP_NEAREST
        | FILTER_LINEAR_MIPMAP_NEAREST
        | FILTER_NEAREST_MIPMAP_LINEAR
        | FILTER_LINEAR_MIPMAP_LINEAR => Ok(Some(code)),
        _ => {
            log::warn!("sampler {sampler}: ignoring unknown filter {code}");
            Ok(None)
        }
    }
}

fn read_wrap(cursor: &mut TokenCursor<'_>, sampler: usize) -> Result<WrapMode, Error> {
    let code = cursor.read_i64()?;
    WrapMode::from_gltf_code(code).ok_or(Error::UnknownWrapMode {
        sampler,
        value: code,
    })
}

pub(super) fn decode_samplers(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    for_each_element(cursor, census.samplers, |cursor, index, keys| {
        let mut mag = None;
        let mut min = None;
        let mut sampler = Sampler::default();

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::MagFilter => mag = read_filter_code(cursor, index)?,
                Key::MinFilter => min = read_filter_code(cursor, index)?,
                Key::WrapS => sampler.wrap_s = read_wrap(cursor, index)?,
                Key::WrapT => sampler.wrap_t = read_wrap(cursor, index)?,
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        (sampler.filter, sampler.mipmaps) = derive_filter(mag, min);
        arena.samplers.push(sampler);
        Ok(())
    })
}

/// Textures copy their sampler's state, so samplers must already be decoded.
pub(super) fn decode_textures(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    for_each_element(cursor, census.textures, |cursor, _index, keys| {
        let mut image = None;
        let mut sampler_index = None;

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Source => image = read_index(cursor)?,
                Key::Sampler => sampler_index = read_index(cursor)?,
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        let sampler = match sampler_index {
            Some(i) => *arena.samplers.get(i).ok_or(Error::InvalidReference {
                kind: "sampler",
                index: i,
                count: arena.samplers.len(),
            })?,
            None => Sampler::default(),
        };
        arena.textures.push(Texture {
            image,
            sampler: sampler_index,
            filter: sampler.filter,
            mipmaps: sampler.mipmaps,
            wrap_s: sampler.wrap_s,
            wrap_t: sampler.wrap_t,
        });
        Ok(())
    })
}
