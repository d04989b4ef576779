use rand::Rng;

/// Nono dígito fixo dos CPFs sintéticos.
const NONO_DIGITO: u8 = 2;

/// Gera um CPF sintético (11 dígitos) com dígitos verificadores válidos.
///
/// Os oito primeiros dígitos são aleatórios, o nono é fixo (`2`) e os dois
/// últimos são calculados pelo módulo 11 ponderado.
///
/// Não há garantia de unicidade entre chamadas: o número serve apenas para
/// preencher o campo de identificação do destinatário.
///
/// ### Exemplo
/// ```
/// use converter_remessas_dhl::{digito_verificador, gerar_cpf};
///
/// let cpf = gerar_cpf();
/// let digitos: Vec<u8> = cpf.bytes().map(|b| b - b'0').collect();
///
/// assert_eq!(cpf.len(), 11);
/// assert_eq!(digito_verificador(&digitos[..9]), digitos[9]);
/// assert_eq!(digito_verificador(&digitos[..10]), digitos[10]);
/// ```
pub fn gerar_cpf() -> String {
    gerar_cpf_com(&mut rand::rng())
}

/// Variante de [`gerar_cpf`] com gerador de números aleatórios explícito.
pub fn gerar_cpf_com<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digitos: Vec<u8> = (0..8).map(|_| rng.random_range(0..=9)).collect();
    digitos.push(NONO_DIGITO);

    let digito_1 = digito_verificador(&digitos);
    digitos.push(digito_1);

    let digito_2 = digito_verificador(&digitos);
    digitos.push(digito_2);

    digitos.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Dígito verificador pelo módulo 11.
///
/// Os pesos decrescem a partir de `len + 1` (10 para 9 dígitos, 11 para 10 dígitos).
/// Resultado maior que 9 vira 0.
pub fn digito_verificador(digitos: &[u8]) -> u8 {
    let peso_inicial = digitos.len() + 1;

    let soma: usize = digitos
        .iter()
        .enumerate()
        .map(|(i, &d)| usize::from(d) * (peso_inicial - i))
        .sum();

    match 11 - (soma % 11) {
        resto if resto > 9 => 0,
        resto => resto as u8,
    }
}
