use std::{io, sync::Arc};

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront::pricing::CartTotals;
use storefront_app::{
    config::AppConfig,
    domain::{
        carts::{CartLine, CartStore, QuantityChange},
        identities::IdentityUuid,
        products::ProductUuid,
    },
    remote::RestBackend,
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    /// Identity whose cart to act on
    ///
    /// Must be the user the access token was issued for. The backend scopes every
    /// row to the token's user, so any other identity shows an empty cart and has
    /// its writes rejected.
    #[arg(long, env = "STOREFRONT_IDENTITY")]
    identity: IdentityUuid,

    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and its totals
    Show,

    /// Add units of a product, merging into an existing line
    Add {
        /// Product UUID
        #[arg(long)]
        product: ProductUuid,

        /// Units to add
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Set the quantity of a line (values below 1 are ignored)
    Set {
        /// Product UUID
        #[arg(long)]
        product: ProductUuid,

        /// New quantity
        #[arg(long, allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a product's line
    Remove {
        /// Product UUID
        #[arg(long)]
        product: ProductUuid,
    },

    /// Remove every line
    Clear,
}

pub(crate) async fn run(config: AppConfig, command: CartCommand) -> Result<(), String> {
    let options = config.store.options().map_err(|error| error.to_string())?;

    let backend = RestBackend::new(config.backend.into_rest_config(options.currency))
        .map_err(|error| format!("failed to build backend client: {error}"))?;

    let mut store = CartStore::new(Arc::new(backend), command.identity, options);

    // Clear deletes by identity and needs no local lines.
    if !matches!(command.command, CartSubcommand::Clear) {
        store
            .load()
            .await
            .map_err(|error| format!("failed to load cart: {error}"))?;
    }

    let mut notes = Vec::new();

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product, quantity } => store
            .add(product, quantity)
            .await
            .map_err(|error| format!("failed to add product: {error}"))?,
        CartSubcommand::Set { product, quantity } => {
            let change = store
                .set_quantity(product, quantity)
                .await
                .map_err(|error| format!("failed to set quantity: {error}"))?;

            if change == QuantityChange::Ignored {
                notes.push(format!("quantity {quantity} is below 1, nothing changed"));
            }
        }
        CartSubcommand::Remove { product } => store
            .remove(product)
            .await
            .map_err(|error| format!("failed to remove product: {error}"))?,
        CartSubcommand::Clear => store
            .clear()
            .await
            .map_err(|error| format!("failed to clear cart: {error}"))?,
    }

    let totals = store
        .totals()
        .map_err(|error| format!("failed to price cart: {error}"))?;

    let mut out = io::stdout().lock();

    render_cart(&mut out, store.lines(), &totals, &notes)
        .map_err(|error| format!("failed to write output: {error}"))
}

fn render_cart(
    out: &mut impl io::Write,
    lines: &[CartLine],
    totals: &CartTotals<'_>,
    notes: &[String],
) -> io::Result<()> {
    for note in notes {
        writeln!(out, "{note}")?;
    }

    if lines.is_empty() {
        return writeln!(out, "cart is empty");
    }

    let mut builder = Builder::default();

    builder.push_record(["#", "Product", "Qty", "Price", "Was", "Total", ""]);

    for (idx, line) in lines.iter().enumerate() {
        builder.push_record(line_cells(idx, line));
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..6), Alignment::right());

    writeln!(out, "{table}")?;

    let savings_points = (totals.savings_percent() * Decimal::ONE_HUNDRED).round_dp(2);

    writeln!(out, " Items:     {}", totals.item_count)?;
    writeln!(out, " Subtotal:  {}", totals.subtotal)?;
    writeln!(out, " Savings:   ({savings_points:.2}%) {}", totals.savings)?;

    if totals.unpriced_lines > 0 {
        writeln!(
            out,
            " {} unavailable line(s) left out of the subtotal",
            totals.unpriced_lines
        )?;
    }

    Ok(())
}

fn line_cells(idx: usize, line: &CartLine) -> [String; 7] {
    let position = format!("{}", idx + 1);
    let product = line.product_uuid.to_string();
    let quantity = line.quantity.to_string();

    let Some(snapshot) = line.product else {
        return [
            position,
            product,
            quantity,
            String::new(),
            String::new(),
            String::new(),
            "unavailable".to_string(),
        ];
    };

    let was = snapshot
        .discount_price
        .map(|_| snapshot.price.to_string())
        .unwrap_or_default();

    let total = line
        .line_total()
        .ok()
        .flatten()
        .map(|total| total.to_string())
        .unwrap_or_default();

    let mut note = line
        .discount_percent()
        .map(|percent| format!("-{percent}%"))
        .unwrap_or_default();

    if !line.is_in_stock() {
        if !note.is_empty() {
            note.push(' ');
        }

        note.push_str("low stock");
    }

    [
        position,
        product,
        quantity,
        snapshot.effective_price().to_string(),
        was,
        total,
        note,
    ]
}
