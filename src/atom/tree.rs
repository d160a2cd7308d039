//! Parsed box tree.

use crate::{
    atom_types::{
        Avc1, AvcC, Co64, Ctts, Esds, Hdlr, Mdhd, Mp4a, Mvhd,
        Stsc, Stss, Stsz, Stts, Tfdt, Tkhd, Trun,
    },
    FourCC,
};

/// A decoded leaf box.
///
/// `co64` is stored as `Stco`, so that both chunk offset
/// variants are found in the same place.
#[derive(Debug, Clone)]
pub enum Atom {
    Mvhd(Mvhd),
    Tkhd(Tkhd),
    Mdhd(Mdhd),
    Hdlr(Hdlr),
    Avc1(Avc1),
    AvcC(AvcC),
    Mp4a(Mp4a),
    Esds(Esds),
    Stts(Stts),
    Ctts(Ctts),
    Stsc(Stsc),
    Stss(Stss),
    Stsz(Stsz),
    Stco(Co64),
    Tfdt(Tfdt),
    Trun(Trun),
}

impl Atom {
    /// FourCC the atom is stored under.
    pub fn fourcc(&self) -> FourCC {
        match self {
            Self::Mvhd(_) => FourCC::Mvhd,
            Self::Tkhd(_) => FourCC::Tkhd,
            Self::Mdhd(_) => FourCC::Mdhd,
            Self::Hdlr(_) => FourCC::Hdlr,
            Self::Avc1(_) => FourCC::Avc1,
            Self::AvcC(_) => FourCC::AvcC,
            Self::Mp4a(_) => FourCC::Mp4a,
            Self::Esds(_) => FourCC::Esds,
            Self::Stts(_) => FourCC::Stts,
            Self::Ctts(_) => FourCC::Ctts,
            Self::Stsc(_) => FourCC::Stsc,
            Self::Stss(_) => FourCC::Stss,
            Self::Stsz(_) => FourCC::Stsz,
            Self::Stco(_) => FourCC::Stco,
            Self::Tfdt(_) => FourCC::Tfdt,
            Self::Trun(_) => FourCC::Trun,
        }
    }
}

/// One level of a parsed box tree.
///
/// Container boxes (including `stsd`) are kept as child trees
/// in order of appearance, repeated FourCCs allowed.
/// Leaf boxes are kept once per FourCC, a later box
/// replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    pub(crate) children: Vec<(FourCC, BoxTree)>,
    pub(crate) atoms: Vec<Atom>,
}

impl BoxTree {
    /// `true` if nothing was decoded at this level.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.atoms.is_empty()
    }

    /// Append an empty child tree for container `name`
    /// and return it.
    pub(crate) fn push_child(&mut self, name: FourCC) -> &mut BoxTree {
        self.children.push((name, BoxTree::default()));
        let last = self.children.len() - 1;
        &mut self.children[last].1
    }

    /// Store a decoded leaf, replacing one of the same kind.
    pub(crate) fn insert(&mut self, atom: Atom) {
        let name = atom.fourcc();
        self.atoms.retain(|a| a.fourcc() != name);
        self.atoms.push(atom);
    }

    /// Child trees for container `name`, in order of appearance.
    pub fn children<'a>(&'a self, name: &FourCC) -> impl Iterator<Item = &'a BoxTree> + 'a {
        let name = name.to_owned();
        self.children.iter()
            .filter(move |(n, _)| n == &name)
            .map(|(_, tree)| tree)
    }

    /// First child tree for container `name`.
    pub fn first(&self, name: &FourCC) -> Option<&BoxTree> {
        self.children.iter()
            .find(|(n, _)| n == name)
            .map(|(_, tree)| tree)
    }

    /// Follows the first child at each step, e.g.
    /// `[Moov, Trak, Mdia, Minf, Stbl, Stsd]`.
    pub fn path(&self, path: &[FourCC]) -> Option<&BoxTree> {
        path.iter()
            .try_fold(self, |tree, name| tree.first(name))
    }

    /// FourCCs present at this level, containers first.
    pub fn names(&self) -> Vec<FourCC> {
        self.children.iter()
            .map(|(n, _)| n.to_owned())
            .chain(self.atoms.iter().map(|a| a.fourcc()))
            .collect()
    }

    pub fn mvhd(&self) -> Option<&Mvhd> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Mvhd(v) => Some(v),
            _ => None,
        })
    }

    pub fn tkhd(&self) -> Option<&Tkhd> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Tkhd(v) => Some(v),
            _ => None,
        })
    }

    pub fn mdhd(&self) -> Option<&Mdhd> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Mdhd(v) => Some(v),
            _ => None,
        })
    }

    pub fn hdlr(&self) -> Option<&Hdlr> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Hdlr(v) => Some(v),
            _ => None,
        })
    }

    pub fn avc1(&self) -> Option<&Avc1> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Avc1(v) => Some(v),
            _ => None,
        })
    }

    pub fn avcc(&self) -> Option<&AvcC> {
        self.atoms.iter().find_map(|a| match a {
            Atom::AvcC(v) => Some(v),
            _ => None,
        })
    }

    pub fn mp4a(&self) -> Option<&Mp4a> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Mp4a(v) => Some(v),
            _ => None,
        })
    }

    pub fn esds(&self) -> Option<&Esds> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Esds(v) => Some(v),
            _ => None,
        })
    }

    pub fn stts(&self) -> Option<&Stts> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Stts(v) => Some(v),
            _ => None,
        })
    }

    pub fn ctts(&self) -> Option<&Ctts> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Ctts(v) => Some(v),
            _ => None,
        })
    }

    pub fn stsc(&self) -> Option<&Stsc> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Stsc(v) => Some(v),
            _ => None,
        })
    }

    pub fn stss(&self) -> Option<&Stss> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Stss(v) => Some(v),
            _ => None,
        })
    }

    pub fn stsz(&self) -> Option<&Stsz> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Stsz(v) => Some(v),
            _ => None,
        })
    }

    /// Chunk offsets from either `stco` or `co64`.
    pub fn stco(&self) -> Option<&Co64> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Stco(v) => Some(v),
            _ => None,
        })
    }

    pub fn tfdt(&self) -> Option<&Tfdt> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Tfdt(v) => Some(v),
            _ => None,
        })
    }

    pub fn trun(&self) -> Option<&Trun> {
        self.atoms.iter().find_map(|a| match a {
            Atom::Trun(v) => Some(v),
            _ => None,
        })
    }
}
