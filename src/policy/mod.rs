//! Ordered policy chains (spec §4.2, §4.3): each chain is a sequence of
//! checks evaluated in declaration order, the first failing check
//! determining the terminal status. Grounded on the original `dspolicy.go`
//! policy-list-of-functions shape, reimplemented as a sequence of plain
//! functions folded left to right rather than a trait-object list, since
//! every chain here is fixed at compile time (design note, spec §9).

pub mod ds;
pub mod nameserver;

/// What the querier observed before a policy chain runs: either a nameserver
/// IP could not be resolved at all, the DNS transport itself failed, or a
/// response arrived. Resolution and transport are distinct failure sources
/// but the nameserver policy chain's network-error classifier (spec
/// §4.2.1) treats them uniformly as the first ordered check.
#[derive(Debug)]
pub enum ProbeOutcome {
    Response(crate::dns::DNSPacket),
    UnknownHost,
    Timeout,
    ConnectionFailure,
}

impl From<Result<(crate::dns::DNSPacket, crate::transport::Protocol), crate::transport::TransportError>>
    for ProbeOutcome
{
    fn from(
        result: Result<
            (crate::dns::DNSPacket, crate::transport::Protocol),
            crate::transport::TransportError,
        >,
    ) -> Self {
        match result {
            Ok((packet, _protocol)) => ProbeOutcome::Response(packet),
            Err(crate::transport::TransportError::Timeout) => ProbeOutcome::Timeout,
            Err(_) => ProbeOutcome::ConnectionFailure,
        }
    }
}
