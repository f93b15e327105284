use std::collections::HashMap;

use crate::models::{Car, CarId, Persona};

/// Static description of a catalog entry
struct CarRecord {
    id: CarId,
    name: &'static str,
    persona: Persona,
    category: &'static str,
    price: u32,
    year: u16,
    mpg: u16,
    features: &'static [&'static str],
    brand: &'static str,
    made_in: &'static str,
}

impl CarRecord {
    #[allow(clippy::too_many_arguments)]
    const fn new(
        id: CarId,
        name: &'static str,
        persona: Persona,
        category: &'static str,
        price: u32,
        year: u16,
        mpg: u16,
        features: &'static [&'static str],
        brand: &'static str,
        made_in: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            persona,
            category,
            price,
            year,
            mpg,
            features,
            brand,
            made_in,
        }
    }

    fn to_car(&self) -> Car {
        Car {
            id: self.id,
            name: self.name.to_string(),
            persona: self.persona,
            category: self.category.to_string(),
            price: self.price,
            year: self.year,
            mpg: self.mpg,
            features: self.features.iter().map(|f| f.to_string()).collect(),
            brand: self.brand.to_string(),
            made_in: self.made_in.to_string(),
        }
    }
}

#[rustfmt::skip]
const CARS: &[CarRecord] = &[
    CarRecord::new(1, "Toyota Prius", Persona::Eco, "hybrid", 24525, 2024, 52, &["hybrid", "fuel-efficient", "reliable"], "Toyota", "USA"),
    CarRecord::new(2, "Nissan Leaf", Persona::Eco, "electric", 28140, 2024, 123, &["electric", "zero-emissions", "quiet"], "Nissan", "USA"),
    CarRecord::new(3, "Tesla Model 3", Persona::Eco, "electric", 38990, 2024, 132, &["electric", "autopilot", "fast"], "Tesla", "USA"),
    CarRecord::new(4, "Honda Insight", Persona::Eco, "hybrid", 23200, 2024, 55, &["hybrid", "stylish", "efficient"], "Honda", "USA"),
    CarRecord::new(5, "Chevrolet Bolt EV", Persona::Eco, "electric", 26595, 2024, 120, &["electric", "affordable", "practical"], "Chevrolet", "USA"),
    CarRecord::new(6, "Ford Mustang Mach-E", Persona::Eco, "electric", 42995, 2024, 100, &["electric", "sporty", "suv"], "Ford", "USA"),
    CarRecord::new(7, "Hyundai Ioniq 5", Persona::Eco, "electric", 41550, 2024, 110, &["electric", "futuristic", "fast-charging"], "Hyundai", "Korea"),
    CarRecord::new(8, "Kia Niro EV", Persona::Eco, "electric", 39550, 2024, 105, &["electric", "crossover", "practical"], "Kia", "Korea"),
    CarRecord::new(9, "Tesla Model Y", Persona::Eco, "electric", 44990, 2024, 115, &["electric", "suv", "autopilot"], "Tesla", "USA"),
    CarRecord::new(10, "Toyota RAV4 Hybrid", Persona::Eco, "hybrid", 32500, 2024, 40, &["hybrid", "suv", "reliable"], "Toyota", "USA"),
    CarRecord::new(11, "Honda CR-V Hybrid", Persona::Eco, "hybrid", 33500, 2024, 38, &["hybrid", "suv", "spacious"], "Honda", "USA"),
    CarRecord::new(12, "Ford Escape Hybrid", Persona::Eco, "hybrid", 31500, 2024, 41, &["hybrid", "suv", "practical"], "Ford", "USA"),
    CarRecord::new(13, "Chevrolet Equinox", Persona::Eco, "gas", 26500, 2024, 31, &["efficient", "suv", "affordable"], "Chevrolet", "USA"),
    CarRecord::new(14, "Volkswagen ID.4", Persona::Eco, "electric", 38995, 2024, 107, &["electric", "german", "practical"], "Volkswagen", "Germany"),
    CarRecord::new(15, "Audi Q4 e-tron", Persona::Eco, "electric", 49900, 2024, 115, &["electric", "luxury", "premium"], "Audi", "Germany"),
    CarRecord::new(16, "BMW 5 Series", Persona::Luxury, "sedan", 55000, 2024, 28, &["premium", "sporty", "technology"], "BMW", "Germany"),
    CarRecord::new(17, "Mercedes-Benz E-Class", Persona::Luxury, "sedan", 58000, 2024, 26, &["luxury", "comfort", "elegant"], "Mercedes-Benz", "Germany"),
    CarRecord::new(18, "Audi A6", Persona::Luxury, "sedan", 56000, 2024, 27, &["premium", "quattro", "sophisticated"], "Audi", "Germany"),
    CarRecord::new(19, "Lexus LS", Persona::Luxury, "sedan", 78000, 2024, 25, &["luxury", "reliable", "quiet"], "Lexus", "Japan"),
    CarRecord::new(20, "Tesla Model S", Persona::Luxury, "electric", 89990, 2024, 120, &["electric", "luxury", "autopilot"], "Tesla", "USA"),
    CarRecord::new(21, "Porsche 911", Persona::Luxury, "sports", 106100, 2024, 20, &["sports", "premium", "iconic"], "Porsche", "Germany"),
    CarRecord::new(22, "Range Rover Sport", Persona::Luxury, "suv", 85000, 2024, 19, &["luxury", "off-road", "premium"], "Land Rover", "UK"),
    CarRecord::new(23, "Bentley Continental GT", Persona::Luxury, "grand-tourer", 220000, 2024, 16, &["ultra-luxury", "handcrafted", "exclusive"], "Bentley", "UK"),
    CarRecord::new(24, "BMW X5", Persona::Luxury, "suv", 65000, 2024, 22, &["luxury", "suv", "sporty"], "BMW", "USA"),
    CarRecord::new(25, "Mercedes-Benz GLE", Persona::Luxury, "suv", 58000, 2024, 23, &["luxury", "suv", "comfort"], "Mercedes-Benz", "USA"),
    CarRecord::new(26, "Audi Q7", Persona::Luxury, "suv", 59000, 2024, 21, &["luxury", "suv", "quattro"], "Audi", "Slovakia"),
    CarRecord::new(27, "Lexus RX", Persona::Luxury, "suv", 48000, 2024, 29, &["luxury", "suv", "reliable"], "Lexus", "Canada"),
    CarRecord::new(28, "Cadillac Escalade", Persona::Luxury, "suv", 79000, 2024, 18, &["luxury", "suv", "american"], "Cadillac", "USA"),
    CarRecord::new(29, "Lincoln Navigator", Persona::Luxury, "suv", 78000, 2024, 19, &["luxury", "suv", "american"], "Lincoln", "USA"),
    CarRecord::new(30, "Genesis GV80", Persona::Luxury, "suv", 57000, 2024, 23, &["luxury", "suv", "korean"], "Genesis", "Korea"),
    CarRecord::new(31, "Honda Civic", Persona::Budget, "sedan", 23950, 2024, 33, &["reliable", "fuel-efficient", "practical"], "Honda", "USA"),
    CarRecord::new(32, "Toyota Corolla", Persona::Budget, "sedan", 21500, 2024, 32, &["reliable", "affordable", "efficient"], "Toyota", "USA"),
    CarRecord::new(33, "Kia Rio", Persona::Budget, "subcompact", 16550, 2024, 36, &["affordable", "compact", "efficient"], "Kia", "Korea"),
    CarRecord::new(34, "Nissan Versa", Persona::Budget, "subcompact", 15980, 2024, 35, &["affordable", "basic", "reliable"], "Nissan", "Mexico"),
    CarRecord::new(35, "Hyundai Accent", Persona::Budget, "subcompact", 16100, 2024, 33, &["affordable", "warranty", "practical"], "Hyundai", "Korea"),
    CarRecord::new(36, "Mitsubishi Mirage", Persona::Budget, "subcompact", 14995, 2024, 39, &["affordable", "fuel-efficient", "basic"], "Mitsubishi", "Thailand"),
    CarRecord::new(37, "Chevrolet Spark", Persona::Budget, "subcompact", 14200, 2024, 33, &["affordable", "compact", "city-friendly"], "Chevrolet", "Korea"),
    CarRecord::new(38, "Ford Fiesta", Persona::Budget, "subcompact", 14850, 2024, 31, &["affordable", "fun-to-drive", "compact"], "Ford", "Mexico"),
    CarRecord::new(39, "Toyota Camry", Persona::Budget, "sedan", 26500, 2024, 32, &["reliable", "midsize", "efficient"], "Toyota", "USA"),
    CarRecord::new(40, "Honda Accord", Persona::Budget, "sedan", 27200, 2024, 30, &["reliable", "midsize", "practical"], "Honda", "USA"),
    CarRecord::new(41, "Nissan Sentra", Persona::Budget, "sedan", 20500, 2024, 33, &["affordable", "compact", "efficient"], "Nissan", "Mexico"),
    CarRecord::new(42, "Mazda 3", Persona::Budget, "sedan", 22500, 2024, 31, &["stylish", "compact", "fun-to-drive"], "Mazda", "Mexico"),
    CarRecord::new(43, "Subaru Impreza", Persona::Budget, "sedan", 23500, 2024, 30, &["awd", "compact", "reliable"], "Subaru", "USA"),
    CarRecord::new(44, "Volkswagen Jetta", Persona::Budget, "sedan", 20500, 2024, 31, &["german", "compact", "efficient"], "Volkswagen", "Mexico"),
    CarRecord::new(45, "Kia Forte", Persona::Budget, "sedan", 19500, 2024, 32, &["affordable", "compact", "warranty"], "Kia", "Korea"),
    CarRecord::new(46, "Toyota RAV4", Persona::Budget, "suv", 28475, 2024, 30, &["reliable", "practical", "family-friendly"], "Toyota", "USA"),
    CarRecord::new(47, "Honda CR-V", Persona::Budget, "suv", 29500, 2024, 29, &["reliable", "spacious", "efficient"], "Honda", "USA"),
    CarRecord::new(48, "Ford Escape", Persona::Budget, "suv", 27500, 2024, 28, &["practical", "versatile", "affordable"], "Ford", "USA"),
    CarRecord::new(49, "Mazda CX-5", Persona::Budget, "suv", 26500, 2024, 28, &["stylish", "fun-to-drive", "reliable"], "Mazda", "Japan"),
    CarRecord::new(50, "Nissan Rogue", Persona::Budget, "suv", 28500, 2024, 30, &["practical", "spacious", "efficient"], "Nissan", "USA"),
    CarRecord::new(51, "Hyundai Tucson", Persona::Budget, "suv", 26500, 2024, 29, &["stylish", "practical", "warranty"], "Hyundai", "Korea"),
    CarRecord::new(52, "Kia Sportage", Persona::Budget, "suv", 25500, 2024, 28, &["affordable", "practical", "warranty"], "Kia", "Korea"),
    CarRecord::new(53, "Subaru Forester", Persona::Budget, "suv", 26500, 2024, 29, &["awd", "practical", "reliable"], "Subaru", "Japan"),
    CarRecord::new(54, "Volkswagen Tiguan", Persona::Budget, "suv", 27500, 2024, 27, &["german", "practical", "premium"], "Volkswagen", "Mexico"),
    CarRecord::new(55, "Chevrolet Equinox", Persona::Budget, "suv", 26500, 2024, 31, &["practical", "efficient", "american"], "Chevrolet", "USA"),
    CarRecord::new(56, "Ford F-150", Persona::Budget, "truck", 34585, 2024, 20, &["truck", "powerful", "american"], "Ford", "USA"),
    CarRecord::new(57, "Chevrolet Silverado", Persona::Budget, "truck", 36500, 2024, 19, &["truck", "powerful", "american"], "Chevrolet", "USA"),
    CarRecord::new(58, "Ram 1500", Persona::Budget, "truck", 38000, 2024, 21, &["truck", "powerful", "american"], "Ram", "USA"),
    CarRecord::new(59, "Toyota Tundra", Persona::Budget, "truck", 38500, 2024, 18, &["truck", "reliable", "japanese"], "Toyota", "USA"),
    CarRecord::new(60, "GMC Sierra", Persona::Budget, "truck", 37500, 2024, 19, &["truck", "premium", "american"], "GMC", "USA"),
    CarRecord::new(61, "Nissan Titan", Persona::Budget, "truck", 39500, 2024, 17, &["truck", "reliable", "japanese"], "Nissan", "USA"),
    CarRecord::new(62, "Honda Ridgeline", Persona::Budget, "truck", 38500, 2024, 22, &["truck", "practical", "japanese"], "Honda", "USA"),
    CarRecord::new(63, "Ford Expedition", Persona::Budget, "suv", 52000, 2024, 18, &["large-suv", "powerful", "american"], "Ford", "USA"),
    CarRecord::new(64, "Chevrolet Tahoe", Persona::Budget, "suv", 54000, 2024, 17, &["large-suv", "powerful", "american"], "Chevrolet", "USA"),
    CarRecord::new(65, "Toyota Sequoia", Persona::Budget, "suv", 58000, 2024, 16, &["large-suv", "reliable", "japanese"], "Toyota", "USA"),
    CarRecord::new(66, "Ford Mustang", Persona::Luxury, "sports", 28500, 2024, 22, &["sports", "american", "iconic"], "Ford", "USA"),
    CarRecord::new(67, "Chevrolet Camaro", Persona::Luxury, "sports", 26500, 2024, 21, &["sports", "american", "powerful"], "Chevrolet", "USA"),
    CarRecord::new(68, "Dodge Challenger", Persona::Luxury, "sports", 32000, 2024, 19, &["sports", "american", "muscle"], "Dodge", "USA"),
    CarRecord::new(69, "BMW M3", Persona::Luxury, "sports", 75000, 2024, 18, &["sports", "german", "premium"], "BMW", "Germany"),
    CarRecord::new(70, "Mercedes-AMG C63", Persona::Luxury, "sports", 78000, 2024, 17, &["sports", "german", "luxury"], "Mercedes-Benz", "Germany"),
    CarRecord::new(71, "Audi RS5", Persona::Luxury, "sports", 76000, 2024, 19, &["sports", "german", "quattro"], "Audi", "Germany"),
    CarRecord::new(72, "Lexus RC F", Persona::Luxury, "sports", 67000, 2024, 20, &["sports", "japanese", "reliable"], "Lexus", "Japan"),
    CarRecord::new(73, "Nissan Z", Persona::Luxury, "sports", 42000, 2024, 22, &["sports", "japanese", "affordable"], "Nissan", "Japan"),
    CarRecord::new(74, "Subaru WRX", Persona::Budget, "sports", 31000, 2024, 23, &["sports", "awd", "japanese"], "Subaru", "Japan"),
    CarRecord::new(75, "Volkswagen Golf GTI", Persona::Budget, "sports", 30500, 2024, 25, &["sports", "german", "hot-hatch"], "Volkswagen", "Germany"),
];

/// Read-only car catalog
///
/// Preserves the order cars were supplied in; lookups by id go through an index.
#[derive(Debug, Clone)]
pub struct Catalog {
    cars: Vec<Car>,
    index: HashMap<CarId, usize>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The built-in US-market catalog
    pub fn builtin() -> Self {
        Self::new(CARS.iter().map(CarRecord::to_car).collect())
    }

    /// Creates a catalog from an explicit car list
    ///
    /// If two cars share an id, lookups resolve to the first one.
    pub fn new(cars: Vec<Car>) -> Self {
        let mut index = HashMap::with_capacity(cars.len());
        for (position, car) in cars.iter().enumerate() {
            index.entry(car.id).or_insert(position);
        }
        Self { cars, index }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn get(&self, id: CarId) -> Option<&Car> {
        self.index.get(&id).map(|&position| &self.cars[position])
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_has_unique_ids() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 75);

        let ids: HashSet<CarId> = catalog.cars().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_every_persona_is_represented() {
        let catalog = Catalog::builtin();
        for persona in Persona::ALL {
            assert!(catalog.cars().iter().any(|c| c.persona == persona));
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = Catalog::builtin();
        let car = catalog.get(3).unwrap();
        assert_eq!(car.name, "Tesla Model 3");
        assert_eq!(car.persona, Persona::Eco);
        assert!(car.has_feature("electric"));
        assert!(catalog.get(9999).is_none());
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first_entry() {
        let mut first = Catalog::builtin().get(1).cloned().unwrap();
        let mut second = first.clone();
        first.name = "first".to_string();
        second.name = "second".to_string();

        let catalog = Catalog::new(vec![first, second]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().name, "first");
    }
}
