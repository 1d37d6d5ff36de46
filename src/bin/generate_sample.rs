use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

/// (UF, lat, lon)
const STATES: [(&str, f64, f64); 27] = [
    ("AC", -8.77, -70.55),
    ("AL", -9.62, -36.82),
    ("AM", -3.47, -65.10),
    ("AP", 1.41, -51.77),
    ("BA", -13.29, -41.71),
    ("CE", -5.20, -39.53),
    ("DF", -15.83, -47.86),
    ("ES", -19.19, -40.34),
    ("GO", -15.98, -49.86),
    ("MA", -5.42, -45.44),
    ("MG", -18.10, -44.38),
    ("MS", -20.51, -54.54),
    ("MT", -12.64, -55.42),
    ("PA", -3.79, -52.48),
    ("PB", -7.28, -36.72),
    ("PE", -8.38, -37.86),
    ("PI", -6.60, -42.28),
    ("PR", -24.89, -51.55),
    ("RJ", -22.25, -42.66),
    ("RN", -5.81, -36.59),
    ("RO", -10.83, -63.34),
    ("RR", 1.99, -61.33),
    ("RS", -30.17, -53.50),
    ("SC", -27.45, -50.95),
    ("SE", -10.57, -37.45),
    ("SP", -22.19, -48.79),
    ("TO", -9.46, -48.26),
];

/// (product, category, base price)
const PRODUCTS: [(&str, &str, f64); 12] = [
    ("Cama box", "moveis", 700.0),
    ("Mesa de jantar", "moveis", 900.0),
    ("Guitarra", "instrumentos musicais", 1500.0),
    ("Bateria", "instrumentos musicais", 2200.0),
    ("Celular ABXY", "eletronicos", 2100.0),
    ("TV Led UHD 4K", "eletronicos", 3200.0),
    ("Jogo de panelas", "utilidades domesticas", 150.0),
    ("Lava louças", "eletrodomesticos", 2500.0),
    ("Bola de futebol", "esporte e lazer", 50.0),
    ("Corda de pular", "esporte e lazer", 20.0),
    ("Modelagem preditiva", "livros", 90.0),
    ("Boneca bebê", "brinquedos", 60.0),
];

const SELLERS: [&str; 8] = [
    "Thiago Silva",
    "Mariana Ferreira",
    "Pedro Gomes",
    "Camila Ribeiro",
    "Rafael Costa",
    "Lucas Oliveira",
    "Larissa Alves",
    "Bruna Rodrigues",
];

const PAYMENT_TYPES: [&str; 4] = ["cartao_credito", "boleto", "cupom", "cartao_debito"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate_sale(rng: &mut SimpleRng, first_day: NaiveDate, days: i64) -> Value {
    let (product, category, base) = *rng.pick(&PRODUCTS);
    let (uf, lat, lon) = *rng.pick(&STATES);
    let seller = *rng.pick(&SELLERS);
    let payment = *rng.pick(&PAYMENT_TYPES);

    let price = round2(base * (0.8 + 0.4 * rng.next_f64()));
    let freight = round2(price * (0.03 + 0.05 * rng.next_f64()));
    let offset = (rng.next_u64() % days as u64) as i64;
    let date = first_day + Duration::days(offset);
    let rating = 1 + rng.next_u64() % 5;
    let installments = if payment == "cartao_credito" { 1 + rng.next_u64() % 12 } else { 1 };

    json!({
        "Produto": product,
        "Categoria do Produto": category,
        "Preço": price,
        "Frete": freight,
        "Data da Compra": date.format("%d/%m/%Y").to_string(),
        "Vendedor": seller,
        "Local da compra": uf,
        "Avaliação da compra": rating,
        "Tipo de pagamento": payment,
        "Quantidade de parcelas": installments,
        "lat": lat,
        "lon": lon,
    })
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let first_day = NaiveDate::from_ymd_opt(2020, 1, 1).context("invalid start date")?;
    let last_day = NaiveDate::from_ymd_opt(2023, 12, 31).context("invalid end date")?;
    let days = (last_day - first_day).num_days() + 1;

    let n_sales = 5000;
    let sales: Vec<Value> = (0..n_sales)
        .map(|_| generate_sale(&mut rng, first_day, days))
        .collect();

    let output_path = "sample_sales.json";
    let text = serde_json::to_string_pretty(&sales).context("serializing sales")?;
    std::fs::write(output_path, text).with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {n_sales} sales ({first_day} to {last_day}) to {output_path}");
    Ok(())
}
