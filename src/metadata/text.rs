//! `tEXt`, `zTXt`, `iTXt`: textual metadata, Latin-1 or UTF-8, optionally
//! zlib-compressed.

use crate::chunk::ChunkType;
use crate::deflate::DeflateParams;
use crate::error::{PngError, PngResult};

fn split_keyword(data: &[u8], chunk_type: ChunkType) -> PngResult<(&[u8], &[u8])> {
  let pos = data.iter().position(|&b| b == 0).ok_or(PngError::MalformedChunk(chunk_type, data.len()))?;
  Ok((&data[..pos], &data[pos + 1..]))
}

/// `tEXt`: a keyword and uncompressed Latin-1 text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TEXt {
  pub keyword: Vec<u8>,
  pub text: Vec<u8>,
}
impl TEXt {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let (keyword, text) = split_keyword(data, ChunkType::TEXT)?;
    Ok(Self { keyword: keyword.to_vec(), text: text.to_vec() })
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = self.keyword.clone();
    out.push(0);
    out.extend_from_slice(&self.text);
    out
  }
}

/// `zTXt`: a keyword and zlib-compressed Latin-1 text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZTXt {
  pub keyword: Vec<u8>,
  pub text: Vec<u8>,
}
impl ZTXt {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let (keyword, rest) = split_keyword(data, ChunkType::ZTXT)?;
    let (&compression_method, zlib_data) = rest.split_first().ok_or(PngError::MalformedChunk(ChunkType::ZTXT, data.len()))?;
    if compression_method != 0 {
      return Err(PngError::MalformedChunk(ChunkType::ZTXT, data.len()));
    }
    let text = miniz_oxide::inflate::decompress_to_vec_zlib(zlib_data)
      .map_err(|_| PngError::DeflateFailed("zTXt payload failed to decompress"))?;
    Ok(Self { keyword: keyword.to_vec(), text })
  }

  pub fn to_bytes(&self, params: DeflateParams) -> Vec<u8> {
    let mut out = self.keyword.clone();
    out.push(0);
    out.push(0); // compression method
    out.extend_from_slice(&crate::deflate::compress_zlib(&self.text, params));
    out
  }
}

/// `iTXt`: international text, UTF-8, optionally zlib-compressed, with
/// optional language-tag and translated-keyword fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ITXt {
  pub keyword: Vec<u8>,
  pub compressed: bool,
  pub language_tag: String,
  pub translated_keyword: String,
  pub text: String,
}
impl ITXt {
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    let (keyword, rest) = split_keyword(data, ChunkType::ITXT)?;
    let &[compression_flag, compression_method, ref rest @ ..] = rest else {
      return Err(PngError::MalformedChunk(ChunkType::ITXT, data.len()));
    };
    let compressed = match compression_flag {
      0 => false,
      1 => true,
      _ => return Err(PngError::MalformedChunk(ChunkType::ITXT, data.len())),
    };
    if compressed && compression_method != 0 {
      return Err(PngError::MalformedChunk(ChunkType::ITXT, data.len()));
    }
    let lang_end = rest.iter().position(|&b| b == 0).ok_or(PngError::MalformedChunk(ChunkType::ITXT, data.len()))?;
    let language_tag = String::from_utf8_lossy(&rest[..lang_end]).into_owned();
    let rest = &rest[lang_end + 1..];
    let kw_end = rest.iter().position(|&b| b == 0).ok_or(PngError::MalformedChunk(ChunkType::ITXT, data.len()))?;
    let translated_keyword =
      String::from_utf8(rest[..kw_end].to_vec()).map_err(|_| PngError::MalformedChunk(ChunkType::ITXT, data.len()))?;
    let payload = &rest[kw_end + 1..];
    let text_bytes = if compressed {
      miniz_oxide::inflate::decompress_to_vec_zlib(payload)
        .map_err(|_| PngError::DeflateFailed("iTXt payload failed to decompress"))?
    } else {
      payload.to_vec()
    };
    let text = String::from_utf8(text_bytes).map_err(|_| PngError::MalformedChunk(ChunkType::ITXT, data.len()))?;
    Ok(Self { keyword: keyword.to_vec(), compressed, language_tag, translated_keyword, text })
  }

  pub fn to_bytes(&self, params: DeflateParams) -> Vec<u8> {
    let mut out = self.keyword.clone();
    out.push(0);
    out.push(self.compressed as u8);
    out.push(0); // compression method, always zlib/deflate when compressed
    out.extend_from_slice(self.language_tag.as_bytes());
    out.push(0);
    out.extend_from_slice(self.translated_keyword.as_bytes());
    out.push(0);
    if self.compressed {
      out.extend_from_slice(&crate::deflate::compress_zlib(self.text.as_bytes(), params));
    } else {
      out.extend_from_slice(self.text.as_bytes());
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_round_trips() {
    let t = TEXt { keyword: b"Comment".to_vec(), text: b"hello world".to_vec() };
    assert_eq!(TEXt::parse(&t.to_bytes()).unwrap(), t);
  }

  #[test]
  fn ztxt_round_trips() {
    let t = ZTXt { keyword: b"Comment".to_vec(), text: b"hello world, compressed".repeat(10) };
    let bytes = t.to_bytes(DeflateParams::default());
    assert_eq!(ZTXt::parse(&bytes).unwrap(), t);
  }

  #[test]
  fn itxt_round_trips_uncompressed() {
    let t = ITXt {
      keyword: b"Title".to_vec(),
      compressed: false,
      language_tag: "en".into(),
      translated_keyword: "Title".into(),
      text: "hello".into(),
    };
    let bytes = t.to_bytes(DeflateParams::default());
    assert_eq!(ITXt::parse(&bytes).unwrap(), t);
  }

  #[test]
  fn itxt_round_trips_compressed() {
    let t = ITXt {
      keyword: b"Title".to_vec(),
      compressed: true,
      language_tag: "en".into(),
      translated_keyword: "Title".into(),
      text: "hello, compressed world".repeat(10),
    };
    let bytes = t.to_bytes(DeflateParams::default());
    assert_eq!(ITXt::parse(&bytes).unwrap(), t);
  }
}
