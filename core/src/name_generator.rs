//! Deterministic operator name generation using curated name lists.
//!
//! Names follow the Brazilian call-center exports: first name + surname,
//! with accents. Placeholder labels mimic the non-human rows the telephony
//! platform emits, so synthetic batches exercise the dark list.

use rand::{seq::SliceRandom, Rng};

/// Deterministic operator name generator using curated name lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last) deterministically
    pub fn generate_full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
        let first_name = pick(rng, Self::first_names());
        let last_name = pick(rng, Self::last_names());
        format!("{} {}", first_name, last_name)
    }

    /// A roster of `n` distinct operator names.
    pub fn generate_roster<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<String> {
        let capacity = Self::first_names().len() * Self::last_names().len();
        let n = n.min(capacity);
        let mut roster: Vec<String> = Vec::with_capacity(n);
        while roster.len() < n {
            let name = Self::generate_full_name(rng);
            if !roster.contains(&name) {
                roster.push(name);
            }
        }
        roster
    }

    /// Operator label that should never survive the dark list.
    pub fn generate_placeholder<R: Rng + ?Sized>(rng: &mut R) -> String {
        let label = pick(rng, Self::placeholder_labels());
        if label.ends_with(' ') {
            format!("{}{}", label, pick(rng, Self::first_names()))
        } else {
            label.to_string()
        }
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Ana", "Beatriz", "Bruna", "Camila", "Carla", "Daniela", "Fernanda",
            "Gabriela", "Juliana", "Larissa", "Mariana", "Patrícia", "Renata",
            "Tatiane", "Vanessa", "Aline", "Bruno", "Carlos", "Diego", "Eduardo",
            "Felipe", "Gustavo", "Henrique", "João", "Leonardo", "Lucas", "Marcelo",
            "Rafael", "Rodrigo", "Thiago", "Vinícius", "André",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Silva", "Santos", "Oliveira", "Souza", "Rodrigues", "Ferreira", "Alves",
            "Pereira", "Lima", "Gomes", "Costa", "Ribeiro", "Martins", "Carvalho",
            "Araújo", "Melo", "Barbosa", "Cardoso", "Rocha", "Dias", "Nascimento",
            "Moreira", "Conceição", "Fonseca",
        ]
    }

    /// A trailing space means a first name follows.
    fn placeholder_labels() -> &'static [&'static str] {
        &[
            "Agentes Indisponíveis", "Agente Indisponivel", "DESL ", "Sistema URA",
            "Admin", "Não informado", "null", "undefined",
        ]
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{stream, StreamSlot};

    #[test]
    fn name_generation_is_deterministic() {
        let mut rng1 = stream(12345, StreamSlot::Operator);
        let mut rng2 = stream(12345, StreamSlot::Operator);

        assert_eq!(
            NameGenerator::generate_full_name(&mut rng1),
            NameGenerator::generate_full_name(&mut rng2),
            "Same seed should produce same name"
        );
    }

    #[test]
    fn roster_names_are_distinct_two_part_names() {
        let mut rng = stream(12345, StreamSlot::Operator);
        let roster = NameGenerator::generate_roster(&mut rng, 40);

        assert_eq!(roster.len(), 40);
        for (i, name) in roster.iter().enumerate() {
            assert_eq!(name.split_whitespace().count(), 2, "Name should have 2 parts: {name}");
            assert!(!roster[i + 1..].contains(name), "Duplicate roster name: {name}");
        }
    }

    #[test]
    fn desl_placeholder_keeps_trailing_space() {
        let mut rng = stream(3, StreamSlot::Operator);
        for _ in 0..200 {
            let label = NameGenerator::generate_placeholder(&mut rng);
            if label.starts_with("DESL") {
                assert!(label.starts_with("DESL "), "{label}");
                assert!(label.len() > "DESL ".len());
            }
        }
    }
}
