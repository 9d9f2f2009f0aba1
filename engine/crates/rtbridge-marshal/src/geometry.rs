use rtbridge_backend::{RtError, RtGeometryDesc, RtResult};
use rtbridge_script::ScriptValue;

use crate::buffer::{count_u32_elements, extract_buffer};

/// `createGeometry(options)` 的编组
///
/// ```text
/// { vertices: Float32Array, indices?: Uint32Array, vertexStride?: number, vertexOffset?: number }
/// ```
///
/// 返回的描述符借用 `options` 中的 buffer。
/// 顶点数量等于 float 数量 / 3；stride 与 offset 缺失或者不是合法的 u32 时使用默认值。
pub fn marshal_geometry_desc(options: &ScriptValue) -> RtResult<RtGeometryDesc<'_>> {
    let Some(object) = options.as_object() else {
        return Err(RtError::invalid_input(format!(
            "expected an options object, got {}",
            options.type_name()
        )));
    };

    let vertices = extract_buffer(object.get("vertices"), "vertices")?;
    let vertex_count = count_u32_elements(vertices) / 3;
    if vertex_count == 0 {
        return Err(RtError::invalid_input("vertices must contain at least one vec3"));
    }

    let vertex_stride = object
        .get("vertexStride")
        .as_u32()
        .map_or(RtGeometryDesc::DEFAULT_VERTEX_STRIDE, |stride| stride as usize);
    let vertex_offset = object
        .get("vertexOffset")
        .as_u32()
        .map_or(RtGeometryDesc::DEFAULT_VERTEX_OFFSET, |offset| offset as usize);
    if vertex_stride < RtGeometryDesc::POSITION_SIZE {
        return Err(RtError::invalid_input(format!(
            "vertexStride {vertex_stride} is smaller than a vec3 position"
        )));
    }
    if vertex_offset + RtGeometryDesc::POSITION_SIZE > vertex_stride {
        return Err(RtError::invalid_input(format!(
            "vertexOffset {vertex_offset} does not fit in vertexStride {vertex_stride}"
        )));
    }

    // indices 可选：缺失或者为空都表示不使用索引
    let indices = match object.get("indices") {
        ScriptValue::Undefined | ScriptValue::Null => None,
        ScriptValue::Buffer(buffer) if buffer.is_empty() => None,
        value => Some(extract_buffer(value, "indices")?),
    };
    let (indices, index_count) = match indices {
        Some(buffer) => {
            let index_count = count_u32_elements(buffer);
            if let Some((at, index)) = buffer.iter_u32().enumerate().find(|(_, index)| *index as usize >= vertex_count)
            {
                return Err(RtError::invalid_input(format!(
                    "index {index} at {at} is out of range for {vertex_count} vertices"
                )));
            }
            (Some(&buffer.bytes()[..index_count * size_of::<u32>()]), index_count)
        }
        None => (None, 0),
    };

    Ok(RtGeometryDesc {
        vertices: vertices.bytes(),
        vertex_count,
        vertex_stride,
        vertex_offset,
        indices,
        index_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rtbridge_script::{ScriptBuffer, ScriptObject};

    const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    fn options(object: ScriptObject) -> ScriptValue {
        ScriptValue::from(object)
    }

    #[test]
    fn test_defaults() {
        let value = options(ScriptObject::new().with("vertices", ScriptBuffer::from_f32(&TRIANGLE)));
        let desc = marshal_geometry_desc(&value).unwrap();
        assert_eq!(desc.vertex_count, 3);
        assert_eq!(desc.vertex_stride, 12);
        assert_eq!(desc.vertex_offset, 0);
        assert!(!desc.is_indexed());
        assert_eq!(desc.index_count, 0);
        assert_eq!(desc.position(1), Some(Vec3::X));
    }

    #[test]
    fn test_wrong_shape_falls_back_to_default() {
        let value = options(
            ScriptObject::new()
                .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
                .with("vertexStride", "24")
                .with("vertexOffset", -4.0),
        );
        let desc = marshal_geometry_desc(&value).unwrap();
        assert_eq!(desc.vertex_stride, 12);
        assert_eq!(desc.vertex_offset, 0);
    }

    #[test]
    fn test_indexed() {
        let value = options(
            ScriptObject::new()
                .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
                .with("indices", ScriptBuffer::from_u32(&[0, 1, 2])),
        );
        let desc = marshal_geometry_desc(&value).unwrap();
        assert!(desc.is_indexed());
        assert_eq!(desc.index_count, 3);
        assert_eq!(desc.iter_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_vertex_count_rounds_down() {
        // 10 个 float 只能组成 3 个顶点
        let value = options(ScriptObject::new().with("vertices", ScriptBuffer::from_f32(&[0.0; 10])));
        assert_eq!(marshal_geometry_desc(&value).unwrap().vertex_count, 3);
    }

    #[test]
    fn test_invalid_input() {
        let cases = [
            ScriptValue::Undefined,
            options(ScriptObject::new()),
            options(ScriptObject::new().with("vertices", ScriptBuffer::from_f32(&[]))),
            options(ScriptObject::new().with("vertices", ScriptBuffer::from_f32(&[1.0, 2.0]))),
            options(
                ScriptObject::new()
                    .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
                    .with("vertexStride", 8u32),
            ),
            options(
                ScriptObject::new()
                    .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
                    .with("vertexStride", 16u32)
                    .with("vertexOffset", 8u32),
            ),
            options(
                ScriptObject::new()
                    .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
                    .with("indices", ScriptBuffer::from_u32(&[0, 1, 3])),
            ),
            options(
                ScriptObject::new()
                    .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
                    .with("indices", vec![ScriptValue::from(0u32)]),
            ),
        ];
        for value in cases {
            assert!(
                matches!(marshal_geometry_desc(&value), Err(RtError::InvalidInput(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_out_of_range_index_message() {
        let value = options(
            ScriptObject::new()
                .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
                .with("indices", ScriptBuffer::from_u32(&[0, 5, 1])),
        );
        assert_eq!(
            marshal_geometry_desc(&value).unwrap_err().to_string(),
            "index 5 at 1 is out of range for 3 vertices"
        );
    }
}
