//! Recursive descent over an in-memory buffer of boxes.

use tracing::{debug, trace};

use crate::{
    atom_types::{
        table_fits, Avc1, AvcC, Co64, Ctts, Esds, Hdlr, Mdhd, Mp4a, Mvhd,
        Stco, Stsc, Stss, Stsz, Stts, Tfdt, Tkhd, Trun,
    },
    reader::{read_atom, read_big32},
    sps::SpsDecoder,
    FourCC,
    Mp4Error,
};

use super::{box_info, Atom, BoxInfo, BoxTree};

/// Version/flags plus entry count preceding `stsd` entries.
const STSD_HEADER: usize = 8;

/// Decodes buffers into [`BoxTree`]s.
///
/// Malformed media never aborts a parse: a box that fails
/// to decode is logged and left out, and scanning always
/// advances by the declared box size.
pub struct BoxParser<'a> {
    sps: &'a dyn SpsDecoder,
}

impl<'a> BoxParser<'a> {
    pub fn new(sps: &'a dyn SpsDecoder) -> Self {
        Self { sps }
    }

    /// Parse all boxes in `buf`.
    pub fn parse(&self, buf: &[u8]) -> BoxTree {
        let mut tree = BoxTree::default();
        self.parse_container(&mut tree, buf, 0, buf.len());
        tree
    }

    /// Parse the boxes in `buf[offset .. offset + length]` into `parent`.
    pub fn parse_container(
        &self,
        parent: &mut BoxTree,
        buf: &[u8],
        offset: usize,
        length: usize,
    ) {
        let end = offset.saturating_add(length).min(buf.len());
        let mut pos = offset;

        while pos < end {
            let info = match box_info(buf, pos) {
                Ok(info) => info,
                Err(err) => {
                    trace!("Stopping scan @ {pos}: {err}");
                    break;
                }
            };

            if info.is_malformed() {
                debug!("{}", Mp4Error::UnexpectedAtomSize { size: info.size, offset: pos });
                break;
            }

            let Ok(size) = usize::try_from(info.size) else {
                debug!("Box '{}' @ {pos} of {} bytes exceeds address space", info.name, info.size);
                break;
            };
            let next = pos.saturating_add(size);

            if info.fully_loaded && next <= end {
                self.parse_box(parent, &info, &buf[pos .. next]);
            } else {
                trace!("Box '{}' @ {pos} not fully loaded ({} bytes declared)", info.name, info.size);
            }

            pos = next;
        }
    }

    /// Dispatch a single box, `bytes` spans the entire box
    /// including its header.
    fn parse_box(&self, parent: &mut BoxTree, info: &BoxInfo, bytes: &[u8]) {
        let payload = &bytes[info.header_size as usize ..];

        if info.name.is_container() {
            let child = parent.push_child(info.name.to_owned());
            self.parse_container(child, payload, 0, payload.len());
            return;
        }

        let decoded: Result<Atom, Mp4Error> = match &info.name {
            FourCC::Stsd => {
                let child = parent.push_child(FourCC::Stsd);
                self.parse_container(child, payload, STSD_HEADER, payload.len().saturating_sub(STSD_HEADER));
                return;
            },
            FourCC::Mvhd => read_atom::<Mvhd>(payload).map(Atom::Mvhd),
            FourCC::Tkhd => read_atom::<Tkhd>(payload).map(Atom::Tkhd),
            FourCC::Mdhd => read_atom::<Mdhd>(payload).map(Atom::Mdhd),
            FourCC::Hdlr => Hdlr::parse(payload).map(Atom::Hdlr),
            FourCC::Avc1 => read_atom::<Avc1>(payload).map(|mut avc1| {
                self.parse_container(
                    &mut avc1.extensions,
                    payload,
                    Avc1::SIZE,
                    payload.len().saturating_sub(Avc1::SIZE)
                );
                Atom::Avc1(avc1)
            }),
            FourCC::AvcC => read_atom::<AvcC>(payload).map(|mut avcc| {
                avcc.resolve(self.sps);
                Atom::AvcC(avcc)
            }),
            FourCC::Mp4a => read_atom::<Mp4a>(payload).map(|mut mp4a| {
                self.parse_container(
                    &mut mp4a.extensions,
                    payload,
                    Mp4a::SIZE,
                    payload.len().saturating_sub(Mp4a::SIZE)
                );
                Atom::Mp4a(mp4a)
            }),
            FourCC::Esds => Esds::parse(payload).map(Atom::Esds),
            FourCC::Stts => table_fits(payload, "stts", 4, 8, 8)
                .and_then(|_| read_atom::<Stts>(payload))
                .map(Atom::Stts),
            FourCC::Ctts => table_fits(payload, "ctts", 4, 8, 8)
                .and_then(|_| read_atom::<Ctts>(payload))
                .map(Atom::Ctts),
            FourCC::Stsc => table_fits(payload, "stsc", 4, 8, 12)
                .and_then(|_| read_atom::<Stsc>(payload))
                .map(Atom::Stsc),
            FourCC::Stss => table_fits(payload, "stss", 4, 8, 4)
                .and_then(|_| read_atom::<Stss>(payload))
                .map(Atom::Stss),
            FourCC::Stsz => stsz_fits(payload)
                .and_then(|_| read_atom::<Stsz>(payload))
                .map(Atom::Stsz),
            FourCC::Stco => table_fits(payload, "stco", 4, 8, 4)
                .and_then(|_| read_atom::<Stco>(payload))
                .map(|stco| Atom::Stco(Co64::from(stco))),
            FourCC::Co64 => table_fits(payload, "co64", 4, 8, 8)
                .and_then(|_| read_atom::<Co64>(payload))
                .map(Atom::Stco),
            FourCC::Tfdt => read_atom::<Tfdt>(payload).map(Atom::Tfdt),
            FourCC::Trun => table_fits(payload, "trun", 4, 12, 16)
                .and_then(|_| read_atom::<Trun>(payload))
                .map(Atom::Trun),
            name => {
                trace!("Skipping box '{name}' @ {}", info.offset);
                return;
            }
        };

        match decoded {
            Ok(atom) => parent.insert(atom),
            Err(err) => debug!("Failed to decode '{}' @ {}: {err}", info.name, info.offset),
        }
    }
}

/// Per-sample sizes only follow if there is no shared sample size.
fn stsz_fits(payload: &[u8]) -> Result<(), Mp4Error> {
    match read_big32(payload, 4)? {
        0 => table_fits(payload, "stsz", 8, 12, 4),
        _ => Ok(()),
    }
}
