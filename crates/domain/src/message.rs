use crate::question::Question;
use crate::record::ResourceRecord;

/// Response codes this stack reads and writes. FormatError is internal
/// only: undecodable requests are dropped, never answered with rcode 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rcode {
    Ok,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
}

impl Rcode {
    pub fn to_u16(&self) -> u16 {
        match self {
            Rcode::Ok => 0,
            Rcode::FormatError => 1,
            Rcode::ServerFailure => 2,
            Rcode::NameError => 3,
            Rcode::NotImplemented => 4,
            Rcode::Refused => 5,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0 => Some(Rcode::Ok),
            1 => Some(Rcode::FormatError),
            2 => Some(Rcode::ServerFailure),
            3 => Some(Rcode::NameError),
            4 => Some(Rcode::NotImplemented),
            5 => Some(Rcode::Refused),
            _ => None,
        }
    }
}

/// The 16-bit header flags word, minus the Z bits (read as zero, written
/// as zero). TC is modeled but never set on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags {
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub rcode: Rcode,
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self {
            qr: false,
            opcode: 0,
            aa: false,
            tc: false,
            rd: false,
            ra: false,
            rcode: Rcode::Ok,
        }
    }
}

/// A decoded message. Section counts are not stored; they are derived from
/// the section vectors when the message is put on the wire, so an emitted
/// header always matches its sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub id: u16,
    pub flags: HeaderFlags,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl Message {
    /// A fresh query carrying one question.
    pub fn query(id: u16, question: Question, recursion: bool) -> Self {
        Self {
            id,
            flags: HeaderFlags {
                rd: recursion,
                ra: recursion,
                ..HeaderFlags::default()
            },
            questions: vec![question],
            ..Self::default()
        }
    }

    /// The skeleton of a reply to `request`: same ID, question section
    /// echoed, QR set, AA/RD/RA per the server role.
    pub fn reply_to(request: &Message, authoritative: bool, recursion: bool) -> Self {
        Self {
            id: request.id,
            flags: HeaderFlags {
                qr: true,
                aa: authoritative,
                rd: recursion,
                ra: recursion,
                ..HeaderFlags::default()
            },
            questions: request.questions.clone(),
            ..Self::default()
        }
    }

    // Records are prepended, so each section reads in reverse insertion
    // order on the wire. Existing captures depend on this ordering.
    pub fn attach_answer(&mut self, rr: ResourceRecord) {
        self.answers.insert(0, rr);
    }

    pub fn attach_authority(&mut self, rr: ResourceRecord) {
        self.authorities.insert(0, rr);
    }

    pub fn attach_additional(&mut self, rr: ResourceRecord) {
        self.additionals.insert(0, rr);
    }

    pub fn record_count(&self) -> usize {
        self.answers.len() + self.authorities.len() + self.additionals.len()
    }

    /// Applied to a reply after the task queue drains: an empty reply is a
    /// name error no matter what the tasks set along the way.
    pub fn finalize_rcode(&mut self) {
        if self.record_count() == 0 {
            self.flags.rcode = Rcode::NameError;
        }
    }
}
