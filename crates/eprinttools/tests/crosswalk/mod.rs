use super::*;

mod crossref;
mod datacite;
mod eprintsxml;
