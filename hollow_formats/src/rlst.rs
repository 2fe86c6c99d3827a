use std::io::Read;

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};
use serde::Serialize;

/// Sentinel image id meaning "do not draw, let the scene background show".
pub const NO_IMAGE: u16 = 0xFFFF;

/// Sentinel control-variable id meaning "no variable drives this record".
pub const NO_VARIABLE: u16 = 0xFFFF;

/// Height of the playfield in bitmap coordinates. Fullscreen sub-images store
/// a left edge of -1 instead of a source rect and derive it from the region
/// rect flipped into this coordinate space.
pub const VIEW_HEIGHT: i16 = 333;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl Rect {
    pub fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, x: i16, y: i16) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Shared leading fields of every hotspot record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionRecord {
    pub flags: u16,
    pub rect: Rect,
    pub dest: u16,
}

/// Closed set of record type tags. The stream is not self-describing beyond
/// these tags; each tag fixes the exact field layout that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HotspotKind {
    Forward,
    Script,
    Video,
    Switch,
    Picture,
    Slider,
    Drag,
    Cycle,
    Boundary,
}

impl HotspotKind {
    pub fn from_tag(tag: u16) -> Result<Self> {
        Ok(match tag {
            0 => HotspotKind::Forward,
            5 => HotspotKind::Script,
            6 => HotspotKind::Video,
            7 => HotspotKind::Switch,
            8 => HotspotKind::Picture,
            10 => HotspotKind::Slider,
            11 => HotspotKind::Drag,
            12 => HotspotKind::Cycle,
            13 => HotspotKind::Boundary,
            other => bail!("unknown hotspot record tag {other}"),
        })
    }

    pub fn tag(self) -> u16 {
        match self {
            HotspotKind::Forward => 0,
            HotspotKind::Script => 5,
            HotspotKind::Video => 6,
            HotspotKind::Switch => 7,
            HotspotKind::Picture => 8,
            HotspotKind::Slider => 10,
            HotspotKind::Drag => 11,
            HotspotKind::Cycle => 12,
            HotspotKind::Boundary => 13,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotRecord {
    pub kind: HotspotKind,
    pub region: RegionRecord,
    pub payload: HotspotPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HotspotPayload {
    Forward,
    Script(ScriptRecord),
    Video(VideoRecord),
    Switch(SwitchRecord),
    Picture(PictureRecord),
    Slider(DragRecord),
    Drag(DragRecord),
    Boundary {
        enter_opcode: u16,
        leave_opcode: u16,
    },
    Cycle(CycleRecord),
}

/// Compiled script handle: a flat opcode list executed by the script host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptRecord {
    pub opcodes: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub script: ScriptRecord,
    pub file: String,
    pub left: u16,
    pub top: u16,
    pub looping: bool,
    pub reserved0: u16,
    pub play_blocking: bool,
    pub play_on_scene_change: bool,
    pub reserved1: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchRecord {
    pub control_var: u16,
    pub children: Vec<HotspotRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubImageRecord {
    pub image: u16,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PictureRecord {
    pub switch: SwitchRecord,
    pub image_var: u16,
    pub images: Vec<SubImageRecord>,
}

pub type ValueList = Vec<u16>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragRecord {
    pub picture: PictureRecord,
    pub kind: u16,
    pub grab_rect: Rect,
    pub reserved0: u16,
    pub reserved1: u16,
    pub down_opcode: u16,
    pub drag_opcode: u16,
    pub up_opcode: u16,
    pub lists: Vec<ValueList>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    pub picture: PictureRecord,
    pub kind: u16,
    pub grab_rect: Rect,
    pub state0_frame: u16,
    pub state1_frame: u16,
    pub down_opcode: u16,
    pub drag_opcode: u16,
    pub up_opcode: u16,
    pub lists: Vec<ValueList>,
    pub frame_count: u16,
    pub first_frame: u16,
    pub frame_rect: Rect,
}

/// Decode a full hotspot list: a u16 record count followed by tag-prefixed
/// records. Top-level records own their region fields.
pub fn decode_hotspot_list<R: Read>(reader: &mut R) -> Result<Vec<HotspotRecord>> {
    let count = reader
        .read_u16::<LittleEndian>()
        .context("reading hotspot record count")?;
    let mut records = Vec::with_capacity(count as usize);
    for index in 0..count {
        let record = decode_tagged(reader, None)
            .with_context(|| format!("decoding hotspot record {index}"))?;
        records.push(record);
    }
    Ok(records)
}

fn decode_tagged<R: Read>(reader: &mut R, parent: Option<&RegionRecord>) -> Result<HotspotRecord> {
    let tag = reader
        .read_u16::<LittleEndian>()
        .context("reading record type tag")?;
    let kind = HotspotKind::from_tag(tag)?;
    decode_hotspot(reader, kind, parent)
}

/// Decode one record of a known kind. With a parent present the region fields
/// are snapshot-copied from it and the stream cursor advances only past the
/// type-specific payload.
pub fn decode_hotspot<R: Read>(
    reader: &mut R,
    kind: HotspotKind,
    parent: Option<&RegionRecord>,
) -> Result<HotspotRecord> {
    let region = decode_region(reader, parent)?;
    debug!(
        "record kind {:?} flags {:#06x} rect ({},{})-({},{}) dest {}",
        kind,
        region.flags,
        region.rect.left,
        region.rect.top,
        region.rect.right,
        region.rect.bottom,
        region.dest
    );

    let payload = match kind {
        HotspotKind::Forward => HotspotPayload::Forward,
        HotspotKind::Script => HotspotPayload::Script(read_script(reader)?),
        HotspotKind::Video => HotspotPayload::Video(read_video(reader)?),
        HotspotKind::Switch => HotspotPayload::Switch(read_switch(reader, &region)?),
        HotspotKind::Picture => HotspotPayload::Picture(read_picture(reader, &region)?),
        HotspotKind::Slider => HotspotPayload::Slider(read_drag(reader, &region, 4)?),
        HotspotKind::Drag => HotspotPayload::Drag(read_drag(reader, &region, 3)?),
        HotspotKind::Cycle => HotspotPayload::Cycle(read_cycle(reader, &region)?),
        HotspotKind::Boundary => HotspotPayload::Boundary {
            enter_opcode: reader
                .read_u16::<LittleEndian>()
                .context("reading enter opcode")?,
            leave_opcode: reader
                .read_u16::<LittleEndian>()
                .context("reading leave opcode")?,
        },
    };

    Ok(HotspotRecord {
        kind,
        region,
        payload,
    })
}

fn decode_region<R: Read>(reader: &mut R, parent: Option<&RegionRecord>) -> Result<RegionRecord> {
    if let Some(parent) = parent {
        // Child records do not carry their own region fields.
        return Ok(*parent);
    }

    let flags = reader
        .read_u16::<LittleEndian>()
        .context("reading region flags")?;
    let left = reader
        .read_i16::<LittleEndian>()
        .context("reading region left")?;
    let mut top = reader
        .read_i16::<LittleEndian>()
        .context("reading region top")?;
    if top == -1 {
        // Known-bad value in shipped data.
        warn!("region top of -1, clamping to 0");
        top = 0;
    }
    let right = reader
        .read_i16::<LittleEndian>()
        .context("reading region right")?;
    let bottom = reader
        .read_i16::<LittleEndian>()
        .context("reading region bottom")?;
    let dest = reader
        .read_u16::<LittleEndian>()
        .context("reading region destination")?;

    Ok(RegionRecord {
        flags,
        rect: Rect::new(left, top, right, bottom),
        dest,
    })
}

fn read_script<R: Read>(reader: &mut R) -> Result<ScriptRecord> {
    let count = reader
        .read_u16::<LittleEndian>()
        .context("reading script opcode count")?;
    let mut opcodes = Vec::with_capacity(count as usize);
    for index in 0..count {
        let opcode = reader
            .read_u16::<LittleEndian>()
            .with_context(|| format!("reading script opcode {index}"))?;
        opcodes.push(opcode);
    }
    Ok(ScriptRecord { opcodes })
}

fn read_video<R: Read>(reader: &mut R) -> Result<VideoRecord> {
    let script = read_script(reader)?;

    let mut raw = Vec::new();
    loop {
        let byte = reader.read_u8().context("reading video file name")?;
        raw.push(byte);
        if byte == 0 {
            break;
        }
    }
    // The name is padded to an even byte count including the terminator.
    if raw.len() % 2 == 1 {
        reader.read_u8().context("skipping file name pad byte")?;
    }
    while raw.last() == Some(&0) {
        raw.pop();
    }
    let file = String::from_utf8_lossy(&raw).replace('\\', "/");

    // Position values require modulus 10000 to stay in a sane range.
    let left = reader
        .read_u16::<LittleEndian>()
        .context("reading video left")?
        % 10000;
    let top = reader
        .read_u16::<LittleEndian>()
        .context("reading video top")?
        % 10000;
    let looping = reader
        .read_u16::<LittleEndian>()
        .context("reading video loop flag")?;
    let reserved0 = reader
        .read_u16::<LittleEndian>()
        .context("reading video reserved0")?;
    let play_blocking = reader
        .read_u16::<LittleEndian>()
        .context("reading video blocking flag")?;
    let play_on_scene_change = reader
        .read_u16::<LittleEndian>()
        .context("reading video scene-change flag")?;
    let reserved1 = reader
        .read_u16::<LittleEndian>()
        .context("reading video reserved1")?;

    if reserved0 != 1 {
        warn!("video record reserved0 = {reserved0}, expected 1");
    }
    if reserved1 != 0 {
        warn!("video record reserved1 = {reserved1}, expected 0");
    }

    Ok(VideoRecord {
        script,
        file,
        left,
        top,
        looping: looping != 0,
        reserved0,
        play_blocking: play_blocking != 0,
        play_on_scene_change: play_on_scene_change != 0,
        reserved1,
    })
}

fn read_switch<R: Read>(reader: &mut R, region: &RegionRecord) -> Result<SwitchRecord> {
    let control_var = reader
        .read_u16::<LittleEndian>()
        .context("reading switch control variable")?;
    let count = reader
        .read_u16::<LittleEndian>()
        .context("reading sub-record count")?;
    let mut children = Vec::with_capacity(count as usize);
    for index in 0..count {
        let child = decode_tagged(reader, Some(region))
            .with_context(|| format!("decoding sub-record {index}"))?;
        children.push(child);
    }
    Ok(SwitchRecord {
        control_var,
        children,
    })
}

fn read_picture<R: Read>(reader: &mut R, region: &RegionRecord) -> Result<PictureRecord> {
    let switch = read_switch(reader, region)?;
    let image_var = reader
        .read_u16::<LittleEndian>()
        .context("reading image variable")?;
    let count = reader
        .read_u16::<LittleEndian>()
        .context("reading sub-image count")?;

    let mut images = Vec::with_capacity(count as usize);
    for index in 0..count {
        let image = reader
            .read_u16::<LittleEndian>()
            .with_context(|| format!("reading sub-image {index} id"))?;
        let left = reader
            .read_i16::<LittleEndian>()
            .with_context(|| format!("reading sub-image {index} left"))?;
        let rect = if left != -1 {
            let top = reader
                .read_i16::<LittleEndian>()
                .with_context(|| format!("reading sub-image {index} top"))?;
            let right = reader
                .read_i16::<LittleEndian>()
                .with_context(|| format!("reading sub-image {index} right"))?;
            let bottom = reader
                .read_i16::<LittleEndian>()
                .with_context(|| format!("reading sub-image {index} bottom"))?;
            Rect::new(left, top, right, bottom)
        } else {
            // Fullscreen sub-image: use the region rect as the source rect,
            // flipped into bitmap coordinates.
            Rect::new(
                region.rect.left,
                VIEW_HEIGHT - region.rect.bottom,
                region.rect.right,
                VIEW_HEIGHT - region.rect.top,
            )
        };
        images.push(SubImageRecord { image, rect });
    }

    Ok(PictureRecord {
        switch,
        image_var,
        images,
    })
}

fn read_value_list<R: Read>(reader: &mut R) -> Result<ValueList> {
    let count = reader
        .read_u16::<LittleEndian>()
        .context("reading value list count")?;
    let mut values = Vec::with_capacity(count as usize);
    for index in 0..count {
        let value = reader
            .read_u16::<LittleEndian>()
            .with_context(|| format!("reading value {index}"))?;
        values.push(value);
    }
    Ok(values)
}

/// Note the grab rect is stored left, right, top, bottom rather than the
/// l,t,r,b order used by region rects.
fn read_grab_rect<R: Read>(reader: &mut R) -> Result<Rect> {
    let left = reader
        .read_u16::<LittleEndian>()
        .context("reading grab rect left")? as i16;
    let right = reader
        .read_u16::<LittleEndian>()
        .context("reading grab rect right")? as i16;
    let top = reader
        .read_u16::<LittleEndian>()
        .context("reading grab rect top")? as i16;
    let bottom = reader
        .read_u16::<LittleEndian>()
        .context("reading grab rect bottom")? as i16;
    Ok(Rect::new(left, top, right, bottom))
}

fn read_drag<R: Read>(
    reader: &mut R,
    region: &RegionRecord,
    list_count: usize,
) -> Result<DragRecord> {
    let picture = read_picture(reader, region)?;
    let kind = reader
        .read_u16::<LittleEndian>()
        .context("reading drag kind")?;
    let grab_rect = read_grab_rect(reader)?;
    let reserved0 = reader
        .read_u16::<LittleEndian>()
        .context("reading drag reserved0")?;
    let reserved1 = reader
        .read_u16::<LittleEndian>()
        .context("reading drag reserved1")?;
    let down_opcode = reader
        .read_u16::<LittleEndian>()
        .context("reading mouse-down opcode")?;
    let drag_opcode = reader
        .read_u16::<LittleEndian>()
        .context("reading mouse-drag opcode")?;
    let up_opcode = reader
        .read_u16::<LittleEndian>()
        .context("reading mouse-up opcode")?;

    if reserved0 != 0 {
        warn!("drag record reserved0 = {reserved0}, expected 0");
    }
    if reserved1 != 0 {
        warn!("drag record reserved1 = {reserved1}, expected 0");
    }

    let mut lists = Vec::with_capacity(list_count);
    for index in 0..list_count {
        let list = read_value_list(reader).with_context(|| format!("decoding value list {index}"))?;
        lists.push(list);
    }

    Ok(DragRecord {
        picture,
        kind,
        grab_rect,
        reserved0,
        reserved1,
        down_opcode,
        drag_opcode,
        up_opcode,
        lists,
    })
}

fn read_cycle<R: Read>(reader: &mut R, region: &RegionRecord) -> Result<CycleRecord> {
    let picture = read_picture(reader, region)?;
    let kind = reader
        .read_u16::<LittleEndian>()
        .context("reading cycle kind")?;
    let grab_rect = read_grab_rect(reader)?;
    let state0_frame = reader
        .read_u16::<LittleEndian>()
        .context("reading state 0 frame")?;
    let state1_frame = reader
        .read_u16::<LittleEndian>()
        .context("reading state 1 frame")?;
    let down_opcode = reader
        .read_u16::<LittleEndian>()
        .context("reading mouse-down opcode")?;
    let drag_opcode = reader
        .read_u16::<LittleEndian>()
        .context("reading mouse-drag opcode")?;
    let up_opcode = reader
        .read_u16::<LittleEndian>()
        .context("reading mouse-up opcode")?;

    let mut lists = Vec::with_capacity(3);
    for index in 0..3 {
        let list = read_value_list(reader).with_context(|| format!("decoding value list {index}"))?;
        lists.push(list);
    }

    let frame_count = reader
        .read_u16::<LittleEndian>()
        .context("reading frame count")?;
    let first_frame = reader
        .read_u16::<LittleEndian>()
        .context("reading first frame")?;
    let frame_width = reader
        .read_u16::<LittleEndian>()
        .context("reading frame width")? as i16;
    let frame_height = reader
        .read_u16::<LittleEndian>()
        .context("reading frame height")? as i16;
    let frame_left = reader
        .read_u16::<LittleEndian>()
        .context("reading frame left")? as i16;
    let frame_top = reader
        .read_u16::<LittleEndian>()
        .context("reading frame top")? as i16;

    Ok(CycleRecord {
        picture,
        kind,
        grab_rect,
        state0_frame,
        state1_frame,
        down_opcode,
        drag_opcode,
        up_opcode,
        lists,
        frame_count,
        first_frame,
        frame_rect: Rect::new(
            frame_left,
            frame_top,
            frame_left + frame_width,
            frame_top + frame_height,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn push_u16(buffer: &mut Vec<u8>, value: u16) {
        buffer.extend_from_slice(&value.to_le_bytes());
    }

    fn push_i16(buffer: &mut Vec<u8>, value: i16) {
        buffer.extend_from_slice(&value.to_le_bytes());
    }

    fn push_region(buffer: &mut Vec<u8>, flags: u16, rect: Rect, dest: u16) {
        push_u16(buffer, flags);
        push_i16(buffer, rect.left);
        push_i16(buffer, rect.top);
        push_i16(buffer, rect.right);
        push_i16(buffer, rect.bottom);
        push_u16(buffer, dest);
    }

    #[test]
    fn decodes_forward_record() {
        let mut data = Vec::new();
        push_region(&mut data, 0x0002, Rect::new(10, 20, 110, 120), 42);

        let mut cursor = Cursor::new(data.as_slice());
        let record = decode_hotspot(&mut cursor, HotspotKind::Forward, None).expect("decode");
        assert_eq!(record.region.flags, 0x0002);
        assert_eq!(record.region.rect, Rect::new(10, 20, 110, 120));
        assert_eq!(record.region.dest, 42);
        assert_eq!(record.payload, HotspotPayload::Forward);
        assert_eq!(cursor.position() as usize, data.len());
    }

    #[test]
    fn clamps_sentinel_top_to_zero() {
        let mut data = Vec::new();
        push_region(&mut data, 0, Rect::new(5, -1, 50, 60), 0);

        let record =
            decode_hotspot(&mut Cursor::new(data.as_slice()), HotspotKind::Forward, None)
                .expect("decode");
        assert_eq!(record.region.rect.top, 0);
    }

    #[test]
    fn child_records_inherit_region_and_consume_payload_only() {
        let mut data = Vec::new();
        push_region(&mut data, 0x0004, Rect::new(1, 2, 3, 4), 9);
        push_u16(&mut data, 77); // control variable
        push_u16(&mut data, 1); // one child
        push_u16(&mut data, HotspotKind::Script.tag());
        push_u16(&mut data, 2); // opcode count
        push_u16(&mut data, 0x1234);
        push_u16(&mut data, 0x5678);

        let mut cursor = Cursor::new(data.as_slice());
        let record = decode_hotspot(&mut cursor, HotspotKind::Switch, None).expect("decode");
        assert_eq!(cursor.position() as usize, data.len());

        let HotspotPayload::Switch(switch) = &record.payload else {
            panic!("expected switch payload");
        };
        assert_eq!(switch.control_var, 77);
        assert_eq!(switch.children.len(), 1);

        let child = &switch.children[0];
        assert_eq!(child.region, record.region);
        let HotspotPayload::Script(script) = &child.payload else {
            panic!("expected script payload");
        };
        assert_eq!(script.opcodes, vec![0x1234, 0x5678]);
    }

    #[test]
    fn empty_sub_lists_decode_to_empty_vecs() {
        let mut data = Vec::new();
        push_region(&mut data, 0, Rect::default(), 0);
        push_u16(&mut data, NO_VARIABLE);
        push_u16(&mut data, 0); // no children

        let record =
            decode_hotspot(&mut Cursor::new(data.as_slice()), HotspotKind::Switch, None)
                .expect("decode");
        let HotspotPayload::Switch(switch) = record.payload else {
            panic!("expected switch payload");
        };
        assert!(switch.children.is_empty());
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut data = Vec::new();
        push_region(&mut data, 0, Rect::default(), 0);
        push_u16(&mut data, 3); // declares 3 opcodes
        push_u16(&mut data, 0x0001); // only one present

        let result = decode_hotspot(&mut Cursor::new(data.as_slice()), HotspotKind::Script, None);
        assert!(result.is_err());
    }

    #[test]
    fn decodes_video_record_with_name_padding() {
        let mut data = Vec::new();
        push_region(&mut data, 0, Rect::new(0, 0, 100, 100), 0);
        push_u16(&mut data, 0); // empty script
        data.extend_from_slice(b"intro\\a.vid\0"); // 12 bytes incl. NUL, even
        push_u16(&mut data, 10040); // left, stored mod 10000
        push_u16(&mut data, 7);
        push_u16(&mut data, 1); // loop
        push_u16(&mut data, 1); // reserved0
        push_u16(&mut data, 0); // blocking
        push_u16(&mut data, 1); // play on scene change
        push_u16(&mut data, 0); // reserved1

        let mut cursor = Cursor::new(data.as_slice());
        let record = decode_hotspot(&mut cursor, HotspotKind::Video, None).expect("decode");
        assert_eq!(cursor.position() as usize, data.len());

        let HotspotPayload::Video(video) = record.payload else {
            panic!("expected video payload");
        };
        assert_eq!(video.file, "intro/a.vid");
        assert_eq!(video.left, 40);
        assert_eq!(video.top, 7);
        assert!(video.looping);
        assert!(!video.play_blocking);
        assert!(video.play_on_scene_change);
    }

    #[test]
    fn fullscreen_sub_image_derives_rect_from_region() {
        let mut data = Vec::new();
        push_region(&mut data, 0, Rect::new(20, 30, 120, 130), 0);
        push_u16(&mut data, NO_VARIABLE); // switch control variable
        push_u16(&mut data, 0); // no children
        push_u16(&mut data, 4); // image variable
        push_u16(&mut data, 1); // one sub-image
        push_u16(&mut data, 55); // image id
        push_i16(&mut data, -1); // fullscreen marker

        let record =
            decode_hotspot(&mut Cursor::new(data.as_slice()), HotspotKind::Picture, None)
                .expect("decode");
        let HotspotPayload::Picture(picture) = record.payload else {
            panic!("expected picture payload");
        };
        assert_eq!(picture.images.len(), 1);
        let sub = picture.images[0];
        assert_eq!(sub.image, 55);
        assert_eq!(sub.rect, Rect::new(20, VIEW_HEIGHT - 130, 120, VIEW_HEIGHT - 30));
    }

    #[test]
    fn decodes_drag_record_value_lists() {
        let mut data = Vec::new();
        push_region(&mut data, 0, Rect::default(), 0);
        push_u16(&mut data, NO_VARIABLE); // switch control variable
        push_u16(&mut data, 0); // no children
        push_u16(&mut data, NO_VARIABLE); // image variable
        push_u16(&mut data, 0); // no sub-images
        push_u16(&mut data, 2); // kind
        push_u16(&mut data, 1); // grab left
        push_u16(&mut data, 2); // grab right
        push_u16(&mut data, 3); // grab top
        push_u16(&mut data, 4); // grab bottom
        push_u16(&mut data, 0); // reserved0
        push_u16(&mut data, 0); // reserved1
        push_u16(&mut data, 100); // down opcode
        push_u16(&mut data, 101); // drag opcode
        push_u16(&mut data, 102); // up opcode
        push_u16(&mut data, 2); // list 0
        push_u16(&mut data, 11);
        push_u16(&mut data, 12);
        push_u16(&mut data, 0); // list 1 empty
        push_u16(&mut data, 1); // list 2
        push_u16(&mut data, 13);

        let mut cursor = Cursor::new(data.as_slice());
        let record = decode_hotspot(&mut cursor, HotspotKind::Drag, None).expect("decode");
        assert_eq!(cursor.position() as usize, data.len());

        let HotspotPayload::Drag(drag) = record.payload else {
            panic!("expected drag payload");
        };
        assert_eq!(drag.grab_rect, Rect::new(1, 3, 2, 4));
        assert_eq!(drag.down_opcode, 100);
        assert_eq!(drag.lists.len(), 3);
        assert_eq!(drag.lists[0], vec![11, 12]);
        assert!(drag.lists[1].is_empty());
        assert_eq!(drag.lists[2], vec![13]);
    }

    #[test]
    fn decodes_cycle_frame_parameters() {
        let mut data = Vec::new();
        push_region(&mut data, 0, Rect::default(), 0);
        push_u16(&mut data, NO_VARIABLE);
        push_u16(&mut data, 0);
        push_u16(&mut data, NO_VARIABLE);
        push_u16(&mut data, 0);
        push_u16(&mut data, 0); // kind
        push_u16(&mut data, 0); // grab l
        push_u16(&mut data, 0); // grab r
        push_u16(&mut data, 0); // grab t
        push_u16(&mut data, 0); // grab b
        push_u16(&mut data, 0); // state 0 frame
        push_u16(&mut data, 1); // state 1 frame
        push_u16(&mut data, 0); // down opcode
        push_u16(&mut data, 0); // drag opcode
        push_u16(&mut data, 0); // up opcode
        for _ in 0..3 {
            push_u16(&mut data, 0); // empty value lists
        }
        push_u16(&mut data, 5); // frame count
        push_u16(&mut data, 10); // first frame
        push_u16(&mut data, 64); // width
        push_u16(&mut data, 48); // height
        push_u16(&mut data, 100); // left
        push_u16(&mut data, 200); // top

        let record =
            decode_hotspot(&mut Cursor::new(data.as_slice()), HotspotKind::Cycle, None)
                .expect("decode");
        let HotspotPayload::Cycle(cycle) = record.payload else {
            panic!("expected cycle payload");
        };
        assert_eq!(cycle.frame_count, 5);
        assert_eq!(cycle.first_frame, 10);
        assert_eq!(cycle.frame_rect, Rect::new(100, 200, 164, 248));
    }

    #[test]
    fn decodes_tagged_record_list() {
        let mut data = Vec::new();
        push_u16(&mut data, 2);
        push_u16(&mut data, HotspotKind::Forward.tag());
        push_region(&mut data, 0, Rect::new(0, 0, 10, 10), 3);
        push_u16(&mut data, HotspotKind::Boundary.tag());
        push_region(&mut data, 0, Rect::new(10, 0, 20, 10), 0);
        push_u16(&mut data, 7); // enter opcode
        push_u16(&mut data, 8); // leave opcode

        let records = decode_hotspot_list(&mut Cursor::new(data.as_slice())).expect("decode");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, HotspotKind::Forward);
        assert_eq!(
            records[1].payload,
            HotspotPayload::Boundary {
                enter_opcode: 7,
                leave_opcode: 8
            }
        );
    }

    #[test]
    fn unknown_tag_is_fatal() {
        let mut data = Vec::new();
        push_u16(&mut data, 1);
        push_u16(&mut data, 9); // no such record type
        push_region(&mut data, 0, Rect::default(), 0);

        assert!(decode_hotspot_list(&mut Cursor::new(data.as_slice())).is_err());
    }
}
