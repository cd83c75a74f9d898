use crate::models::{Role, TransactionType};

/// Transaction type an ordered role pair can form
///
/// The match is exhaustive over every role pair, so the table is total.
pub fn get_transaction_type(role_a: Role, role_b: Role) -> Option<TransactionType> {
    use Role::*;
    use TransactionType as Tx;

    match (role_a, role_b) {
        (DeployingCapital, DeployingCapital) => Some(Tx::CoInvestment),
        (DeployingCapital, RaisingCapital) => Some(Tx::Investment),
        (DeployingCapital, ExploringPartnerships) => None,
        (DeployingCapital, SeekingTechnology) => Some(Tx::Investment),
        (DeployingCapital, RegulatoryPolicy) => Some(Tx::PolicyDialogue),
        (DeployingCapital, MediaContent) => None,
        (DeployingCapital, Other) => None,

        (RaisingCapital, DeployingCapital) => Some(Tx::Fundraising),
        (RaisingCapital, RaisingCapital) => None,
        (RaisingCapital, ExploringPartnerships) => Some(Tx::GtmPartnership),
        (RaisingCapital, SeekingTechnology) => Some(Tx::TechPartnership),
        (RaisingCapital, RegulatoryPolicy) => Some(Tx::SandboxCandidacy),
        (RaisingCapital, MediaContent) => Some(Tx::MediaExposure),
        (RaisingCapital, Other) => None,

        (ExploringPartnerships, DeployingCapital) => None,
        (ExploringPartnerships, RaisingCapital) => Some(Tx::GtmPartnership),
        (ExploringPartnerships, ExploringPartnerships) => Some(Tx::Partnership),
        (ExploringPartnerships, SeekingTechnology) => Some(Tx::Integration),
        (ExploringPartnerships, RegulatoryPolicy) => Some(Tx::SandboxParticipation),
        (ExploringPartnerships, MediaContent) => None,
        (ExploringPartnerships, Other) => None,

        (SeekingTechnology, DeployingCapital) => Some(Tx::InvestmentPitch),
        (SeekingTechnology, RaisingCapital) => Some(Tx::TechEvaluation),
        (SeekingTechnology, ExploringPartnerships) => Some(Tx::Integration),
        (SeekingTechnology, SeekingTechnology) => Some(Tx::TechnicalCollaboration),
        (SeekingTechnology, RegulatoryPolicy) => Some(Tx::SandboxEvaluation),
        (SeekingTechnology, MediaContent) => None,
        (SeekingTechnology, Other) => None,

        (RegulatoryPolicy, DeployingCapital) => Some(Tx::PolicyDialogue),
        (RegulatoryPolicy, RaisingCapital) => Some(Tx::SandboxCandidates),
        (RegulatoryPolicy, ExploringPartnerships) => Some(Tx::SandboxParticipation),
        (RegulatoryPolicy, SeekingTechnology) => Some(Tx::SandboxEvaluation),
        (RegulatoryPolicy, RegulatoryPolicy) => Some(Tx::PolicyCoordination),
        (RegulatoryPolicy, MediaContent) => Some(Tx::ContentCollaboration),
        (RegulatoryPolicy, Other) => None,

        (MediaContent, DeployingCapital) => None,
        (MediaContent, RaisingCapital) => Some(Tx::MediaExposure),
        (MediaContent, ExploringPartnerships) => None,
        (MediaContent, SeekingTechnology) => None,
        (MediaContent, RegulatoryPolicy) => Some(Tx::ContentCollaboration),
        (MediaContent, MediaContent) => Some(Tx::ContentCollaboration),
        (MediaContent, Other) => None,

        (Other, _) => None,
    }
}

/// First mapped transaction type in role order
///
/// Walks `roles_a` in order and, for each, `roles_b` in order, returning the
/// first pair that maps. Input order decides the result.
pub fn best_transaction_type(roles_a: &[Role], roles_b: &[Role]) -> Option<TransactionType> {
    roles_a
        .iter()
        .flat_map(|ra| roles_b.iter().map(move |rb| (*ra, *rb)))
        .find_map(|(ra, rb)| get_transaction_type(ra, rb))
}
