//! Locate image XObjects drawn by a content stream.
//!
//! Walks the graphics operators that affect placement (`q`, `Q`, `cm`, `Do`)
//! and maps the unit square of each drawn image through the current
//! transformation matrix.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::{debug, trace};

use super::{BoundingBox, ImageSource, PageImage};

/// Form XObjects nested deeper than this are not followed.
const MAX_FORM_DEPTH: usize = 8;

/// Affine transform `[a b c d e f]` as used by the PDF `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() != 6 {
            return None;
        }
        let v: Vec<f32> = operands.iter().map(number).collect::<Option<_>>()?;
        Some(Matrix { a: v[0], b: v[1], c: v[2], d: v[3], e: v[4], f: v[5] })
    }

    /// `self` applied first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    /// Bounding box of the unit square under this transform.
    pub fn unit_square_bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&[
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ])
    }
}

/// Collects placed images while walking content streams.
pub(crate) struct PlacementWalker<'a> {
    doc: &'a Document,
    images: Vec<PageImage>,
}

impl<'a> PlacementWalker<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc, images: Vec::new() }
    }

    pub fn into_images(self) -> Vec<PageImage> {
        self.images
    }

    /// Walk a content stream drawn with `ctm` and `resources` in effect.
    pub fn walk(
        &mut self,
        content: &[u8],
        resources: Option<&Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<(), lopdf::Error> {
        let doc = self.doc;
        let content = Content::decode(content)?;
        let xobjects = resources.and_then(|r| xobject_dict(doc, r));

        let mut ctm = ctm;
        let mut stack: Vec<Matrix> = Vec::new();

        for op in &content.operations {
            match op.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => {
                    if let Some(prev) = stack.pop() {
                        ctm = prev;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        ctm = m.then(&ctm);
                    }
                }
                "Do" => {
                    let Some(Object::Name(name)) = op.operands.first() else {
                        continue;
                    };
                    let Some(xobjects) = xobjects else {
                        trace!("Do without XObject resources");
                        continue;
                    };
                    self.draw_xobject(xobjects, name, resources, ctm, depth);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw_xobject(
        &mut self,
        xobjects: &Dictionary,
        name: &[u8],
        parent_resources: Option<&Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) {
        let doc = self.doc;
        let Ok(entry) = xobjects.get(name) else {
            trace!("Unknown XObject {}", String::from_utf8_lossy(name));
            return;
        };
        let Ok((_, Object::Stream(stream))) = doc.dereference(entry) else {
            return;
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => {
                let Some(source) = image_source(doc, stream) else {
                    return;
                };
                let Some(bbox) = ctm.unit_square_bbox() else {
                    return;
                };
                let index = self.images.len();
                trace!("Image {} placed at {:?}", index, bbox);
                self.images.push(PageImage {
                    index,
                    name: String::from_utf8_lossy(name).into_owned(),
                    bbox,
                    source,
                });
            }
            Ok(b"Form") if depth < MAX_FORM_DEPTH => {
                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|m| doc.dereference(m).ok())
                    .and_then(|(_, m)| m.as_array().ok())
                    .and_then(|arr| Matrix::from_operands(arr))
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| doc.dereference(r).ok())
                    .and_then(|(_, r)| r.as_dict().ok())
                    .or(parent_resources);
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                if let Err(e) = self.walk(&content, form_resources, matrix.then(&ctm), depth + 1) {
                    debug!("Skipping unreadable form XObject: {}", e);
                }
            }
            _ => {}
        }
    }
}

fn xobject_dict<'r>(doc: &'r Document, resources: &'r Dictionary) -> Option<&'r Dictionary> {
    let xobjects = resources.get(b"XObject").ok()?;
    match doc.dereference(xobjects).ok()? {
        (_, Object::Dictionary(dict)) => Some(dict),
        _ => None,
    }
}

/// Read an image XObject's parameters and bytes.
fn image_source(doc: &Document, stream: &Stream) -> Option<ImageSource> {
    let dict = &stream.dict;
    let width = dict.get(b"Width").ok().and_then(number)? as u32;
    let height = dict.get(b"Height").ok().and_then(number)? as u32;

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.clone()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
        _ => None,
    });
    let filter = filter.map(|f| String::from_utf8_lossy(&f).into_owned());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.clone()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
            _ => None,
        })
        .map(|cs| String::from_utf8_lossy(&cs).into_owned())
        .unwrap_or_else(|| "DeviceRGB".to_string());

    let bits_per_component = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(number)
        .unwrap_or(8.0) as u8;

    // JPEG data is kept compressed; everything else is inflated here.
    let data = match filter.as_deref() {
        Some("DCTDecode") => stream.content.clone(),
        _ => stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()),
    };

    Some(ImageSource {
        width,
        height,
        filter,
        color_space,
        bits_per_component,
        data,
    })
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
